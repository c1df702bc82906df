//! Foundation types for Keepsake.
//!
//! Every other Keepsake crate depends on `keepsake-types`. It defines the
//! live [`Document`] with its enumerated [`Section`]s and the record shapes
//! written to the two store partitions.
//!
//! # Key Types
//!
//! - [`Document`]: the single authoritative content tree of a session
//! - [`Section`]: the known, enumerated document sections
//! - [`ContentRecord`]: persisted document without photos or display name
//! - [`PhotoRecord`]: one stored photo (blob or URL plus caption)
//! - [`PhotoId`] / [`RecordKey`]: store keys

pub mod document;
pub mod error;
pub mod ids;
pub mod record;

pub use document::{
    BucketItem, BucketList, Document, Event, GalleryEntry, Homepage, LoveLanguage, LoveLanguages,
    LoveReasons, MemoryEntry, Note, Playlist, Promises, Section, Song, Surprise, VideoMontage,
    DISPLAY_NAME_KEY, PHOTO_GALLERY_KEY,
};
pub use error::TypeError;
pub use ids::{PhotoId, RecordKey};
pub use record::{timestamp_now, Blob, ContentRecord, PhotoRecord, CONTENT_RECORD_ID};
