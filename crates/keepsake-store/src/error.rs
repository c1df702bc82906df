use crate::partition::Partition;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened.
    #[error("failed to open store: {0}")]
    Open(String),

    /// The store was written by a newer schema than this build understands.
    #[error("store schema version {found} is newer than supported version {supported}")]
    VersionTooNew { found: u32, supported: u32 },

    /// The partition has not been created by the upgrade hook.
    #[error("unknown partition: {0}")]
    UnknownPartition(Partition),

    /// A record was handed to the wrong partition.
    #[error("record for partition '{found}' cannot be stored in '{expected}'")]
    PartitionMismatch {
        expected: Partition,
        found: Partition,
    },

    /// An explicit-key partition received a record without a usable key.
    #[error("record in '{0}' has no key")]
    MissingKey(Partition),

    /// The key cannot be used by this backend.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Persisted data failed an integrity or decoding check.
    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure (poisoned lock, aborted task).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
