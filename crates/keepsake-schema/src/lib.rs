//! Default schema and reconciliation for Keepsake documents.
//!
//! # Modules
//!
//! - [`defaults`]: the canonical default [`Document`](keepsake_types::Document)
//! - [`merge`]: recursive JSON merge with atomic arrays
//! - [`reconcile`]: section-aware merge of a persisted record over the defaults
//! - [`error`]: [`SchemaError`]

pub mod defaults;
pub mod error;
pub mod merge;
pub mod reconcile;

pub use defaults::{default_gallery, defaults, ASSET_DIR};
pub use error::{SchemaError, SchemaResult};
pub use merge::deep_merge;
pub use reconcile::reconcile;
