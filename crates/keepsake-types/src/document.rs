//! The live content document and its sections.
//!
//! A [`Document`] is a fixed set of named sections. Each section has a known
//! shape, and every field falls back to its default when absent so that a
//! partially populated JSON tree still decodes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::PhotoId;

/// JSON key of the photo gallery projection.
pub const PHOTO_GALLERY_KEY: &str = "photoGallery";

/// JSON key of the session-only display name.
pub const DISPLAY_NAME_KEY: &str = "SpouseName";

/// The enumerated set of document sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Homepage,
    Events,
    Notes,
    PhotoGallery,
    Promises,
    LoveReasons,
    LoveLanguages,
    BucketList,
    MemoryBook,
    Playlist,
    VideoMontage,
    Surprise,
}

impl Section {
    /// Every section, in document order.
    pub const ALL: [Section; 12] = [
        Section::Homepage,
        Section::Events,
        Section::Notes,
        Section::PhotoGallery,
        Section::Promises,
        Section::LoveReasons,
        Section::LoveLanguages,
        Section::BucketList,
        Section::MemoryBook,
        Section::Playlist,
        Section::VideoMontage,
        Section::Surprise,
    ];

    /// The JSON key this section is stored under.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::Events => "events",
            Self::Notes => "notes",
            Self::PhotoGallery => PHOTO_GALLERY_KEY,
            Self::Promises => "promises",
            Self::LoveReasons => "loveReasons",
            Self::LoveLanguages => "loveLanguages",
            Self::BucketList => "bucketList",
            Self::MemoryBook => "memoryBook",
            Self::Playlist => "playlist",
            Self::VideoMontage => "videoMontage",
            Self::Surprise => "surprise",
        }
    }

    /// Look a section up by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// Whether the section is a list (merged atomically) rather than a
    /// keyed composite.
    pub const fn is_list(&self) -> bool {
        matches!(
            self,
            Self::Events | Self::Notes | Self::PhotoGallery | Self::MemoryBook
        )
    }

    /// Whether the section is persisted with the content record.
    ///
    /// The gallery is a projection of photo records and is stored separately.
    pub const fn is_persisted(&self) -> bool {
        !matches!(self, Self::PhotoGallery)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The single authoritative content tree of a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub homepage: Homepage,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub photo_gallery: Vec<GalleryEntry>,
    #[serde(default)]
    pub promises: Promises,
    #[serde(default)]
    pub love_reasons: LoveReasons,
    #[serde(default)]
    pub love_languages: LoveLanguages,
    #[serde(default)]
    pub bucket_list: BucketList,
    #[serde(default)]
    pub memory_book: Vec<MemoryEntry>,
    #[serde(default)]
    pub playlist: Playlist,
    #[serde(default)]
    pub video_montage: VideoMontage,
    #[serde(default)]
    pub surprise: Surprise,
    /// Display name injected from configuration at load time. Never persisted.
    #[serde(rename = "SpouseName", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Top-level keys this version does not know about, carried through
    /// unchanged so newer records survive an older reader.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// The document as a JSON object.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Decode a document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The form written to the content record: a deep copy with the photo
    /// gallery and the display name removed.
    pub fn persisted_form(&self) -> Result<Value, serde_json::Error> {
        let mut value = self.to_value()?;
        if let Value::Object(map) = &mut value {
            for section in Section::ALL.iter().filter(|s| !s.is_persisted()) {
                map.remove(section.key());
            }
            map.remove(DISPLAY_NAME_KEY);
        }
        Ok(value)
    }

    /// Number of gallery entries.
    pub fn photo_count(&self) -> usize {
        self.photo_gallery.len()
    }
}

/// Landing page content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Homepage {
    pub main_image: String,
    pub intro_message: String,
    pub relationship_tag: String,
    /// RFC 3339 start of the relationship.
    pub relationship_start: String,
}

/// A timeline event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    pub date: String,
    pub title: String,
    pub description: String,
    pub show_year: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A dated note.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub date: String,
    pub text: String,
}

/// One entry of the photo gallery projection.
///
/// `image` is either a memory handle URL, a data URI or a literal URL. The
/// entry never owns the handle behind it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PhotoId>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl GalleryEntry {
    pub fn new(image: impl Into<String>, caption: Option<&str>) -> Self {
        Self {
            id: None,
            image: image.into(),
            caption: caption.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Promises {
    pub intro: String,
    pub promises: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoveReasons {
    pub intro: String,
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoveLanguages {
    pub intro: String,
    pub languages: Vec<LoveLanguage>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoveLanguage {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketList {
    pub intro: String,
    pub items: Vec<BucketItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketItem {
    pub item: String,
    pub description: String,
    pub target_date: String,
    pub icon: String,
    pub completed: bool,
}

/// A guestbook-style memory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryEntry {
    pub date: String,
    pub message: String,
    pub author: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playlist {
    pub intro: String,
    pub songs: Vec<Song>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Song {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    /// Video URL or id the player embeds.
    pub embed_id: String,
    pub note: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoMontage {
    pub intro: String,
    pub file_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Surprise {
    pub title: String,
    pub message: String,
    pub image: String,
    pub wheel_items: Vec<String>,
}
