//! Persisted record shapes for the two store partitions.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::PhotoId;

/// Well-known key of the single content record.
pub const CONTENT_RECORD_ID: &str = "main";

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The persisted, photo-stripped form of the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub content: Value,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl ContentRecord {
    /// Wrap persisted content under the well-known id, stamped now.
    pub fn main(content: Value) -> Self {
        Self {
            id: CONTENT_RECORD_ID.to_string(),
            content,
            last_updated: Some(timestamp_now()),
        }
    }
}

/// Binary payload plus its media type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub mime: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .finish()
    }
}

/// One stored photo.
///
/// A record carries a blob, an external URL, or both. When a blob is present
/// it wins over the URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Assigned by the store on first insert.
    pub id: Option<PhotoId>,
    pub blob: Option<Blob>,
    pub url: Option<String>,
    pub caption: String,
    pub created_at: String,
}

impl PhotoRecord {
    /// A new record backed by a blob.
    pub fn from_blob(blob: Blob, caption: impl Into<String>) -> Self {
        Self {
            id: None,
            blob: Some(blob),
            url: None,
            caption: caption.into(),
            created_at: timestamp_now(),
        }
    }

    /// A new record pointing at an external URL.
    pub fn from_url(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id: None,
            blob: None,
            url: Some(url.into()),
            caption: caption.into(),
            created_at: timestamp_now(),
        }
    }

    pub fn is_blob_backed(&self) -> bool {
        self.blob.is_some()
    }

    /// Swap in a new blob. The stored URL is dropped since the blob now
    /// takes precedence.
    pub fn replace_blob(&mut self, blob: Blob) {
        self.blob = Some(blob);
        self.url = None;
    }
}
