//! Binary asset lifecycle for Keepsake photos.
//!
//! Photos enter through [`compress`], which bounds their byte size and
//! dimensions, and are shown through memory handles minted by the
//! [`HandleRegistry`]. Async callers use [`compress_async`], which runs the
//! same work on the blocking pool. Images embedded in text fields become self-contained
//! data URIs via [`upload_inline_image`].

pub mod compress;
pub mod error;
pub mod registry;

pub use compress::{
    compress, compress_async, to_data_uri, upload_inline_image, ImageConstraints, JPEG_MIME,
};
pub use error::{AssetError, AssetResult};
pub use registry::{is_handle, HandleRegistry, HANDLE_PREFIX};
