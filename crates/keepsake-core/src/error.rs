use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("store error: {0}")]
    Store(#[from] keepsake_store::StoreError),

    #[error("schema error: {0}")]
    Schema(#[from] keepsake_schema::SchemaError),

    #[error("asset error: {0}")]
    Asset(#[from] keepsake_assets::AssetError),

    #[error("photo index {index} out of range (gallery has {len} entries)")]
    PhotoIndex { index: usize, len: usize },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
