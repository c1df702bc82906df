use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Auto-assigned identifier of a stored photo.
///
/// Ids are assigned by the store in strictly increasing order, so sorting by
/// `PhotoId` recovers insertion order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(u64);

impl PhotoId {
    /// Wrap a raw id value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` at `u64::MAX`.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Debug for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhotoId({})", self.0)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhotoId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidPhotoId(s.to_string()))
    }
}

impl From<u64> for PhotoId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Primary key of a record in either store partition.
///
/// The content partition is keyed by explicit names (`"main"`), the photo
/// partition by auto-assigned [`PhotoId`]s.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKey {
    Name(String),
    Photo(PhotoId),
}

impl RecordKey {
    /// Key for a named record.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// The photo id, if this is a photo key.
    pub fn as_photo(&self) -> Option<PhotoId> {
        match self {
            Self::Photo(id) => Some(*id),
            Self::Name(_) => None,
        }
    }

    /// The name, if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Photo(_) => None,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Photo(id) => write!(f, "#{id}"),
        }
    }
}

impl From<PhotoId> for RecordKey {
    fn from(id: PhotoId) -> Self {
        Self::Photo(id)
    }
}
