use async_trait::async_trait;
use keepsake_types::RecordKey;

use crate::error::StoreResult;
use crate::partition::{Partition, Record};

/// Transactional key/object store with named partitions.
///
/// All implementations must satisfy these invariants:
/// - Every operation resolves or fails once its underlying transaction
///   completes; there is no partial result.
/// - `put` on an auto-increment partition assigns a fresh key when the record
///   carries none, and never reuses a key within the store's lifetime.
/// - `put` on an explicit-key partition is a full overwrite of that key.
/// - Records handed to the wrong partition are rejected, never coerced.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read one record. Returns `Ok(None)` if the key does not exist.
    async fn get(&self, partition: Partition, key: &RecordKey) -> StoreResult<Option<Record>>;

    /// Read every record of a partition in ascending key order.
    async fn get_all(&self, partition: Partition) -> StoreResult<Vec<Record>>;

    /// Insert or overwrite a record and return its key.
    async fn put(&self, partition: Partition, record: Record) -> StoreResult<RecordKey>;

    /// Delete a record. Deleting a missing key is not an error.
    async fn delete(&self, partition: Partition, key: &RecordKey) -> StoreResult<()>;

    /// Remove every record of a partition.
    async fn clear(&self, partition: Partition) -> StoreResult<()>;

    /// Clear several partitions.
    ///
    /// Default implementation clears them one at a time. Backends may
    /// override to clear them in a single transaction.
    async fn clear_all(&self, partitions: &[Partition]) -> StoreResult<()> {
        for partition in partitions {
            self.clear(*partition).await?;
        }
        Ok(())
    }
}
