use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use keepsake_types::{ContentRecord, PhotoId, PhotoRecord, RecordKey};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::partition::{check_key, Partition, Record, StoreMeta, DB_NAME, SCHEMA_VERSION};
use crate::traits::ObjectStore;

/// In-memory object store.
///
/// Intended for tests and embedding. Both partitions live behind a single
/// `RwLock`, so a multi-partition clear is one atomic step. Records are
/// cloned on read and write.
pub struct InMemoryObjectStore {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    meta: StoreMeta,
    content: BTreeMap<String, ContentRecord>,
    photos: BTreeMap<PhotoId, PhotoRecord>,
}

impl InMemoryObjectStore {
    /// Create and open an empty store at the current schema version.
    pub fn new() -> Self {
        let mut meta = StoreMeta::fresh(DB_NAME);
        // A fresh store is at version 0, which is always upgradable.
        let _ = meta.open(SCHEMA_VERSION);
        Self::from_meta(meta)
    }

    fn from_meta(meta: StoreMeta) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                meta,
                content: BTreeMap::new(),
                photos: BTreeMap::new(),
            }),
        }
    }

    /// Snapshot of the schema metadata.
    pub fn meta(&self) -> StoreResult<StoreMeta> {
        Ok(self.read_state()?.meta.clone())
    }

    /// Number of records in a partition.
    pub fn len(&self, partition: Partition) -> usize {
        self.read_state()
            .map(|state| match partition {
                Partition::Content => state.content.len(),
                Partition::Photos => state.photos.len(),
            })
            .unwrap_or(0)
    }

    /// Returns `true` if both partitions are empty.
    pub fn is_empty(&self) -> bool {
        Partition::ALL.iter().all(|p| self.len(*p) == 0)
    }

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn clear(&mut self, partition: Partition) -> StoreResult<()> {
        self.meta.ensure(partition)?;
        match partition {
            Partition::Content => self.content.clear(),
            Partition::Photos => self.photos.clear(),
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, partition: Partition, key: &RecordKey) -> StoreResult<Option<Record>> {
        check_key(partition, key)?;
        let state = self.read_state()?;
        state.meta.ensure(partition)?;
        let record = match key {
            RecordKey::Name(name) => state.content.get(name).cloned().map(Record::Content),
            RecordKey::Photo(id) => state.photos.get(id).cloned().map(Record::Photo),
        };
        Ok(record)
    }

    async fn get_all(&self, partition: Partition) -> StoreResult<Vec<Record>> {
        let state = self.read_state()?;
        state.meta.ensure(partition)?;
        let records = match partition {
            Partition::Content => state.content.values().cloned().map(Record::Content).collect(),
            Partition::Photos => state.photos.values().cloned().map(Record::Photo).collect(),
        };
        Ok(records)
    }

    async fn put(&self, partition: Partition, mut record: Record) -> StoreResult<RecordKey> {
        let mut state = self.write_state()?;
        let key = state.meta.assign_key(partition, &mut record)?;
        match (record, &key) {
            (Record::Content(content), RecordKey::Name(name)) => {
                state.content.insert(name.clone(), content);
            }
            (Record::Photo(photo), RecordKey::Photo(id)) => {
                state.photos.insert(*id, photo);
            }
            _ => return Err(StoreError::InvalidKey(key.to_string())),
        }
        debug!(%partition, %key, "put record");
        Ok(key)
    }

    async fn delete(&self, partition: Partition, key: &RecordKey) -> StoreResult<()> {
        check_key(partition, key)?;
        let mut state = self.write_state()?;
        state.meta.ensure(partition)?;
        match key {
            RecordKey::Name(name) => {
                state.content.remove(name);
            }
            RecordKey::Photo(id) => {
                state.photos.remove(id);
            }
        }
        Ok(())
    }

    async fn clear(&self, partition: Partition) -> StoreResult<()> {
        self.write_state()?.clear(partition)
    }

    async fn clear_all(&self, partitions: &[Partition]) -> StoreResult<()> {
        let mut state = self.write_state()?;
        for partition in partitions {
            state.meta.ensure(*partition)?;
        }
        for partition in partitions {
            state.clear(*partition)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("content_count", &self.len(Partition::Content))
            .field("photo_count", &self.len(Partition::Photos))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepsake_types::Blob;
    use serde_json::json;

    fn photo(caption: &str) -> Record {
        Record::from(PhotoRecord::from_blob(
            Blob::new("image/jpeg", caption.as_bytes().to_vec()),
            caption,
        ))
    }

    // -----------------------------------------------------------------------
    // Content partition
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_and_get_content() {
        let store = InMemoryObjectStore::new();
        let key = store
            .put(Partition::Content, ContentRecord::main(json!({ "a": 1 })).into())
            .await
            .unwrap();
        assert_eq!(key, RecordKey::name("main"));

        let record = store
            .get(Partition::Content, &key)
            .await
            .unwrap()
            .expect("should exist")
            .into_content()
            .unwrap();
        assert_eq!(record.content, json!({ "a": 1 }));
    }

    #[tokio::test]
    async fn content_put_overwrites() {
        let store = InMemoryObjectStore::new();
        store
            .put(Partition::Content, ContentRecord::main(json!({ "v": 1 })).into())
            .await
            .unwrap();
        store
            .put(Partition::Content, ContentRecord::main(json!({ "v": 2 })).into())
            .await
            .unwrap();
        assert_eq!(store.len(Partition::Content), 1);
        let all = store.get_all(Partition::Content).await.unwrap();
        assert_eq!(all[0].clone().into_content().unwrap().content, json!({ "v": 2 }));
    }

    #[tokio::test]
    async fn missing_content_is_none() {
        let store = InMemoryObjectStore::new();
        let got = store
            .get(Partition::Content, &RecordKey::name("main"))
            .await
            .unwrap();
        assert!(got.is_none());
    }

    // -----------------------------------------------------------------------
    // Photo partition
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn photo_keys_are_assigned_in_order() {
        let store = InMemoryObjectStore::new();
        let k1 = store.put(Partition::Photos, photo("one")).await.unwrap();
        let k2 = store.put(Partition::Photos, photo("two")).await.unwrap();
        assert!(k1 < k2);

        let all = store.get_all(Partition::Photos).await.unwrap();
        let captions: Vec<_> = all
            .into_iter()
            .map(|r| r.into_photo().unwrap().caption)
            .collect();
        assert_eq!(captions, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn photo_put_with_id_updates_in_place() {
        let store = InMemoryObjectStore::new();
        let key = store.put(Partition::Photos, photo("old")).await.unwrap();
        let mut record = store
            .get(Partition::Photos, &key)
            .await
            .unwrap()
            .unwrap()
            .into_photo()
            .unwrap();
        record.caption = "new".into();
        let again = store.put(Partition::Photos, record.into()).await.unwrap();
        assert_eq!(key, again);
        assert_eq!(store.len(Partition::Photos), 1);
    }

    #[tokio::test]
    async fn delete_photo_and_missing_delete_is_ok() {
        let store = InMemoryObjectStore::new();
        let key = store.put(Partition::Photos, photo("x")).await.unwrap();
        store.delete(Partition::Photos, &key).await.unwrap();
        assert!(store.get(Partition::Photos, &key).await.unwrap().is_none());
        store.delete(Partition::Photos, &key).await.unwrap();
    }

    #[tokio::test]
    async fn keys_are_not_reused_after_clear() {
        let store = InMemoryObjectStore::new();
        let first = store.put(Partition::Photos, photo("a")).await.unwrap();
        store.clear(Partition::Photos).await.unwrap();
        let second = store.put(Partition::Photos, photo("b")).await.unwrap();
        assert!(second > first);
    }

    // -----------------------------------------------------------------------
    // Clear / errors
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn photo_id_at_top_of_range_is_rejected() {
        let store = InMemoryObjectStore::new();
        let mut record = PhotoRecord::from_url("a.jpg", "");
        record.id = Some(PhotoId::new(u64::MAX));
        let err = store.put(Partition::Photos, record.into()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
        assert_eq!(store.len(Partition::Photos), 0);

        let key = store.put(Partition::Photos, photo("next")).await.unwrap();
        assert_eq!(key, RecordKey::Photo(PhotoId::new(1)));
    }

    #[tokio::test]
    async fn clear_all_empties_both_partitions() {
        let store = InMemoryObjectStore::new();
        store
            .put(Partition::Content, ContentRecord::main(json!({})).into())
            .await
            .unwrap();
        store.put(Partition::Photos, photo("a")).await.unwrap();
        store.clear_all(&Partition::ALL).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn wrong_partition_is_rejected() {
        let store = InMemoryObjectStore::new();
        let err = store.put(Partition::Content, photo("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::PartitionMismatch { .. }));
    }

    #[tokio::test]
    async fn wrong_key_shape_is_rejected() {
        let store = InMemoryObjectStore::new();
        let err = store
            .get(Partition::Photos, &RecordKey::name("main"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[test]
    fn new_store_is_at_current_schema() {
        let meta = InMemoryObjectStore::new().meta().unwrap();
        assert_eq!(meta.name, DB_NAME);
        assert_eq!(meta.version, SCHEMA_VERSION);
        assert_eq!(meta.partitions.len(), 2);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryObjectStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("photo_count"));
    }
}
