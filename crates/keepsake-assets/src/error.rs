use thiserror::Error;

/// Errors produced while preparing binary assets.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("empty image input")]
    Empty,

    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("cannot encode image: {0}")]
    Encode(String),

    #[error("compression task failed: {0}")]
    Task(String),

    #[error("image does not fit in {max_bytes} bytes (smallest attempt was {smallest} bytes)")]
    TooLarge { max_bytes: usize, smallest: usize },
}

/// Convenience alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
