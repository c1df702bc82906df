//! Object store gateway for Keepsake.
//!
//! A versioned local store with two partitions: `site_content`, holding the
//! single content record under an explicit key, and `photos`, holding photo
//! records under auto-assigned keys.
//!
//! # Storage Backends
//!
//! All backends implement the async [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`]: both partitions under one lock, no persistence
//! - [`FileObjectStore`]: durable directory-backed store
//!
//! # Design Rules
//!
//! 1. Partitions are created by the upgrade hook, once per schema version.
//! 2. Content writes are full overwrites of a single record.
//! 3. Photo keys increase monotonically and are never reused.
//! 4. Persisted photo records are integrity-checked on read.
//! 5. All I/O errors are propagated as [`StoreError`].
//!
//! UI preference flags live beside the object store in [`prefs`].

pub mod error;
pub mod file;
pub mod memory;
pub mod partition;
pub mod prefs;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileObjectStore;
pub use memory::InMemoryObjectStore;
pub use partition::{KeyPolicy, Partition, Record, StoreMeta, DB_NAME, SCHEMA_VERSION};
pub use prefs::{FilePreferences, InMemoryPreferences, PreferenceStore, EDIT_MODE_KEY, THEME_KEY};
pub use traits::ObjectStore;
