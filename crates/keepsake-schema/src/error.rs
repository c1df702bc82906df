use keepsake_types::Section;
use thiserror::Error;

/// Errors from reconciling persisted content against the schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A persisted section does not have the shape its type expects.
    #[error("section '{section}' is malformed: {source}")]
    Section {
        section: Section,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted content is not a JSON object.
    #[error("persisted content must be an object, got {0}")]
    NotAnObject(&'static str),

    /// Encoding or decoding the whole document failed.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
