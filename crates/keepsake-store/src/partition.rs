//! Partitions, records and the versioned store schema.

use std::fmt;

use keepsake_types::{ContentRecord, PhotoId, PhotoRecord, RecordKey};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Name of the local database.
pub const DB_NAME: &str = "KeepsakeLocalDB";

/// Schema version this build creates and understands.
pub const SCHEMA_VERSION: u32 = 2;

/// How a partition assigns primary keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPolicy {
    /// The record carries its own key.
    Explicit,
    /// The store assigns increasing numeric keys.
    AutoIncrement,
}

/// A named partition of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    #[serde(rename = "site_content")]
    Content,
    #[serde(rename = "photos")]
    Photos,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Content, Partition::Photos];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Content => "site_content",
            Self::Photos => "photos",
        }
    }

    pub const fn key_policy(&self) -> KeyPolicy {
        match self {
            Self::Content => KeyPolicy::Explicit,
            Self::Photos => KeyPolicy::AutoIncrement,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record crossing the store boundary, tagged by family.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Content(ContentRecord),
    Photo(PhotoRecord),
}

impl Record {
    /// The partition this record belongs to.
    pub fn partition(&self) -> Partition {
        match self {
            Self::Content(_) => Partition::Content,
            Self::Photo(_) => Partition::Photos,
        }
    }

    pub fn into_content(self) -> StoreResult<ContentRecord> {
        match self {
            Self::Content(record) => Ok(record),
            other => Err(StoreError::PartitionMismatch {
                expected: Partition::Content,
                found: other.partition(),
            }),
        }
    }

    pub fn into_photo(self) -> StoreResult<PhotoRecord> {
        match self {
            Self::Photo(record) => Ok(record),
            other => Err(StoreError::PartitionMismatch {
                expected: Partition::Photos,
                found: other.partition(),
            }),
        }
    }
}

impl From<ContentRecord> for Record {
    fn from(record: ContentRecord) -> Self {
        Self::Content(record)
    }
}

impl From<PhotoRecord> for Record {
    fn from(record: PhotoRecord) -> Self {
        Self::Photo(record)
    }
}

/// Schema metadata every backend keeps alongside its data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub name: String,
    pub version: u32,
    pub partitions: Vec<Partition>,
    /// Next key the photo partition will hand out.
    pub next_photo_id: u64,
}

impl StoreMeta {
    /// Metadata of a store that has never been opened.
    pub fn fresh(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            partitions: Vec::new(),
            next_photo_id: 1,
        }
    }

    /// Bring the schema up to `target`.
    ///
    /// Runs the upgrade hook only when the recorded version is lower, and the
    /// hook creates only the partitions that do not exist yet. Returns the
    /// partitions created, empty when no upgrade ran.
    pub fn open(&mut self, target: u32) -> StoreResult<Vec<Partition>> {
        if self.version > target {
            return Err(StoreError::VersionTooNew {
                found: self.version,
                supported: target,
            });
        }
        if self.version == target {
            return Ok(Vec::new());
        }

        let mut created = Vec::new();
        for partition in Partition::ALL {
            if !self.partitions.contains(&partition) {
                self.partitions.push(partition);
                created.push(partition);
            }
        }
        info!(
            db = %self.name,
            from = self.version,
            to = target,
            created = created.len(),
            "upgraded store schema"
        );
        self.version = target;
        Ok(created)
    }

    /// Fail unless the upgrade hook has created `partition`.
    pub fn ensure(&self, partition: Partition) -> StoreResult<()> {
        if self.partitions.contains(&partition) {
            Ok(())
        } else {
            Err(StoreError::UnknownPartition(partition))
        }
    }

    /// Check `record` belongs in `partition` and resolve its primary key,
    /// assigning one from the key generator when the partition auto-increments
    /// and the record has none.
    pub fn assign_key(&mut self, partition: Partition, record: &mut Record) -> StoreResult<RecordKey> {
        self.ensure(partition)?;
        if record.partition() != partition {
            return Err(StoreError::PartitionMismatch {
                expected: partition,
                found: record.partition(),
            });
        }
        match record {
            Record::Content(content) => {
                if content.id.is_empty() {
                    return Err(StoreError::MissingKey(partition));
                }
                Ok(RecordKey::Name(content.id.clone()))
            }
            Record::Photo(photo) => {
                let id = match photo.id {
                    Some(id) => {
                        // Explicit ids still advance the generator past them.
                        let after = id.next().ok_or_else(|| exhausted(id))?;
                        self.next_photo_id = self.next_photo_id.max(after.get());
                        id
                    }
                    None => {
                        let id = PhotoId::new(self.next_photo_id);
                        self.next_photo_id = id.next().ok_or_else(|| exhausted(id))?.get();
                        photo.id = Some(id);
                        id
                    }
                };
                Ok(RecordKey::Photo(id))
            }
        }
    }
}

fn exhausted(id: PhotoId) -> StoreError {
    StoreError::InvalidKey(format!("photo id {id} leaves no room for the key generator"))
}

/// Check that `key` has the shape `partition` expects.
pub fn check_key(partition: Partition, key: &RecordKey) -> StoreResult<()> {
    match (partition.key_policy(), key) {
        (KeyPolicy::Explicit, RecordKey::Name(_)) | (KeyPolicy::AutoIncrement, RecordKey::Photo(_)) => {
            Ok(())
        }
        _ => Err(StoreError::InvalidKey(format!("{key} is not a key of '{partition}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opened() -> StoreMeta {
        let mut meta = StoreMeta::fresh(DB_NAME);
        meta.open(SCHEMA_VERSION).unwrap();
        meta
    }

    #[test]
    fn partition_names() {
        assert_eq!(Partition::Content.to_string(), "site_content");
        assert_eq!(Partition::Photos.to_string(), "photos");
        assert_eq!(
            serde_json::to_value(Partition::Photos).unwrap(),
            json!("photos")
        );
    }

    #[test]
    fn key_policies() {
        assert_eq!(Partition::Content.key_policy(), KeyPolicy::Explicit);
        assert_eq!(Partition::Photos.key_policy(), KeyPolicy::AutoIncrement);
    }

    #[test]
    fn first_open_creates_all_partitions() {
        let mut meta = StoreMeta::fresh(DB_NAME);
        let created = meta.open(SCHEMA_VERSION).unwrap();
        assert_eq!(created, vec![Partition::Content, Partition::Photos]);
        assert_eq!(meta.version, SCHEMA_VERSION);
    }

    #[test]
    fn reopen_at_same_version_runs_no_upgrade() {
        let mut meta = opened();
        assert!(meta.open(SCHEMA_VERSION).unwrap().is_empty());
    }

    #[test]
    fn upgrade_only_creates_missing_partitions() {
        let mut meta = StoreMeta {
            name: DB_NAME.into(),
            version: 1,
            partitions: vec![Partition::Content],
            next_photo_id: 1,
        };
        let created = meta.open(SCHEMA_VERSION).unwrap();
        assert_eq!(created, vec![Partition::Photos]);
        assert_eq!(meta.partitions.len(), 2);
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut meta = StoreMeta::fresh(DB_NAME);
        meta.version = SCHEMA_VERSION + 1;
        let err = meta.open(SCHEMA_VERSION).unwrap_err();
        assert!(matches!(err, StoreError::VersionTooNew { .. }));
    }

    #[test]
    fn unopened_store_has_no_partitions() {
        let meta = StoreMeta::fresh(DB_NAME);
        assert!(matches!(
            meta.ensure(Partition::Photos),
            Err(StoreError::UnknownPartition(Partition::Photos))
        ));
    }

    #[test]
    fn photo_keys_auto_increment() {
        let mut meta = opened();
        let mut a = Record::from(PhotoRecord::from_url("a", ""));
        let mut b = Record::from(PhotoRecord::from_url("b", ""));
        let ka = meta.assign_key(Partition::Photos, &mut a).unwrap();
        let kb = meta.assign_key(Partition::Photos, &mut b).unwrap();
        assert_eq!(ka, RecordKey::Photo(PhotoId::new(1)));
        assert_eq!(kb, RecordKey::Photo(PhotoId::new(2)));
        assert_eq!(a.into_photo().unwrap().id, Some(PhotoId::new(1)));
    }

    #[test]
    fn explicit_photo_id_advances_generator() {
        let mut meta = opened();
        let mut record = PhotoRecord::from_url("a", "");
        record.id = Some(PhotoId::new(10));
        let mut record = Record::from(record);
        meta.assign_key(Partition::Photos, &mut record).unwrap();
        assert_eq!(meta.next_photo_id, 11);
    }

    #[test]
    fn maximal_explicit_id_is_rejected() {
        let mut meta = opened();
        let mut record = PhotoRecord::from_url("a", "");
        record.id = Some(PhotoId::new(u64::MAX));
        let err = meta
            .assign_key(Partition::Photos, &mut Record::from(record))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
        assert_eq!(meta.next_photo_id, 1);
    }

    #[test]
    fn exhausted_generator_is_rejected() {
        let mut meta = opened();
        meta.next_photo_id = u64::MAX;
        let mut record = Record::from(PhotoRecord::from_url("a", ""));
        let err = meta.assign_key(Partition::Photos, &mut record).unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
        assert_eq!(record.into_photo().unwrap().id, None);
    }

    #[test]
    fn content_key_comes_from_record() {
        let mut meta = opened();
        let mut record = Record::from(ContentRecord::main(json!({})));
        let key = meta.assign_key(Partition::Content, &mut record).unwrap();
        assert_eq!(key, RecordKey::name("main"));
    }

    #[test]
    fn mismatched_partition_is_rejected() {
        let mut meta = opened();
        let mut record = Record::from(ContentRecord::main(json!({})));
        let err = meta.assign_key(Partition::Photos, &mut record).unwrap_err();
        assert!(matches!(err, StoreError::PartitionMismatch { .. }));
    }

    #[test]
    fn key_shape_is_checked() {
        assert!(check_key(Partition::Content, &RecordKey::name("main")).is_ok());
        assert!(check_key(Partition::Content, &RecordKey::Photo(PhotoId::new(1))).is_err());
        assert!(check_key(Partition::Photos, &RecordKey::name("main")).is_err());
    }
}
