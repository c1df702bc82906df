//! Directory-backed durable object store.
//!
//! On-disk layout:
//! ```text
//! <root>/meta.json                    schema metadata and key generator
//! <root>/site_content/<key>.json      content records (JSON)
//! <root>/photos/<id>.rec              photo records (bincode envelope)
//! ```
//!
//! A photo envelope carries the BLAKE3 hash of its payload, checked on every
//! read. Every file is written to a temporary sibling and renamed into place,
//! so a crash leaves either the old or the new version.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use keepsake_types::{ContentRecord, PhotoId, PhotoRecord, RecordKey};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::partition::{check_key, Partition, Record, StoreMeta, DB_NAME, SCHEMA_VERSION};
use crate::traits::ObjectStore;

const META_FILE: &str = "meta.json";
const CONTENT_EXT: &str = "json";
const PHOTO_EXT: &str = "rec";

/// Framing for a stored photo record.
#[derive(Serialize, Deserialize)]
struct PhotoEnvelope {
    checksum: [u8; 32],
    payload: Vec<u8>,
}

/// Durable object store rooted at a directory.
///
/// Blocking filesystem work runs on tokio's blocking pool; the async methods
/// only wait for it.
#[derive(Clone)]
pub struct FileObjectStore {
    inner: Arc<FileInner>,
}

struct FileInner {
    root: PathBuf,
    meta: Mutex<StoreMeta>,
}

impl FileObjectStore {
    /// Open (creating if needed) the store at `root`, running the upgrade hook
    /// when the recorded schema is older than this build's.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let inner = tokio::task::spawn_blocking(move || FileInner::open(root))
            .await
            .map_err(|e| StoreError::Open(e.to_string()))??;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Snapshot of the schema metadata.
    pub fn meta(&self) -> StoreResult<StoreMeta> {
        Ok(self.inner.meta()?.clone())
    }

    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&FileInner) -> StoreResult<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

impl FileInner {
    fn open(root: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&root)
            .map_err(|e| StoreError::Open(format!("{}: {e}", root.display())))?;

        let meta_path = root.join(META_FILE);
        let mut meta = if meta_path.exists() {
            let bytes = fs::read(&meta_path)?;
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                key: META_FILE.into(),
                reason: e.to_string(),
            })?
        } else {
            StoreMeta::fresh(DB_NAME)
        };

        let created = meta.open(SCHEMA_VERSION)?;
        for partition in &meta.partitions {
            fs::create_dir_all(root.join(partition.name()))?;
        }
        if !created.is_empty() || !meta_path.exists() {
            write_atomic(&root, &meta_path, &serde_json::to_vec_pretty(&meta).map_err(ser)?)?;
        }
        info!(root = %root.display(), version = meta.version, "opened file store");

        Ok(Self {
            root,
            meta: Mutex::new(meta),
        })
    }

    fn meta(&self) -> StoreResult<MutexGuard<'_, StoreMeta>> {
        self.meta
            .lock()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))
    }

    fn partition_dir(&self, partition: Partition) -> PathBuf {
        self.root.join(partition.name())
    }

    fn record_path(&self, partition: Partition, key: &RecordKey) -> StoreResult<PathBuf> {
        check_key(partition, key)?;
        let file = match key {
            RecordKey::Name(name) => {
                validate_name(name)?;
                format!("{name}.{CONTENT_EXT}")
            }
            RecordKey::Photo(id) => format!("{:020}.{PHOTO_EXT}", id.get()),
        };
        Ok(self.partition_dir(partition).join(file))
    }

    fn get(&self, partition: Partition, key: &RecordKey) -> StoreResult<Option<Record>> {
        self.meta()?.ensure(partition)?;
        let path = self.record_path(partition, key)?;
        if !path.exists() {
            return Ok(None);
        }
        read_record(partition, &path, key).map(Some)
    }

    fn get_all(&self, partition: Partition) -> StoreResult<Vec<Record>> {
        self.meta()?.ensure(partition)?;
        let ext = match partition {
            Partition::Content => CONTENT_EXT,
            Partition::Photos => PHOTO_EXT,
        };
        let mut paths = Vec::new();
        for entry in fs::read_dir(self.partition_dir(partition))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                paths.push(path);
            }
        }
        // Photo file names are zero-padded ids, so name order is key order.
        paths.sort();

        paths
            .iter()
            .map(|path| {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_string();
                let key = match partition {
                    Partition::Content => RecordKey::Name(stem),
                    Partition::Photos => stem
                        .parse::<PhotoId>()
                        .map(RecordKey::Photo)
                        .map_err(|e| StoreError::Corrupt {
                            key: path.display().to_string(),
                            reason: e.to_string(),
                        })?,
                };
                read_record(partition, path, &key)
            })
            .collect()
    }

    fn put(&self, partition: Partition, mut record: Record) -> StoreResult<RecordKey> {
        let key = {
            let mut meta = self.meta()?;
            let before = meta.next_photo_id;
            let key = meta.assign_key(partition, &mut record)?;
            if meta.next_photo_id != before {
                // Persist the generator before the record so an id is never
                // handed out twice.
                let bytes = serde_json::to_vec_pretty(&*meta).map_err(ser)?;
                write_atomic(&self.root, &self.root.join(META_FILE), &bytes)?;
            }
            key
        };

        let path = self.record_path(partition, &key)?;
        let bytes = match &record {
            Record::Content(content) => serde_json::to_vec_pretty(content).map_err(ser)?,
            Record::Photo(photo) => encode_photo(photo)?,
        };
        write_atomic(&self.partition_dir(partition), &path, &bytes)?;
        debug!(%partition, %key, bytes = bytes.len(), "wrote record");
        Ok(key)
    }

    fn delete(&self, partition: Partition, key: &RecordKey) -> StoreResult<()> {
        self.meta()?.ensure(partition)?;
        let path = self.record_path(partition, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn clear(&self, partition: Partition) -> StoreResult<()> {
        self.meta()?.ensure(partition)?;
        let dir = self.partition_dir(partition);
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
        info!(%partition, "cleared partition");
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn get(&self, partition: Partition, key: &RecordKey) -> StoreResult<Option<Record>> {
        let key = key.clone();
        self.blocking(move |inner| inner.get(partition, &key)).await
    }

    async fn get_all(&self, partition: Partition) -> StoreResult<Vec<Record>> {
        self.blocking(move |inner| inner.get_all(partition)).await
    }

    async fn put(&self, partition: Partition, record: Record) -> StoreResult<RecordKey> {
        self.blocking(move |inner| inner.put(partition, record)).await
    }

    async fn delete(&self, partition: Partition, key: &RecordKey) -> StoreResult<()> {
        let key = key.clone();
        self.blocking(move |inner| inner.delete(partition, &key)).await
    }

    async fn clear(&self, partition: Partition) -> StoreResult<()> {
        self.blocking(move |inner| inner.clear(partition)).await
    }
}

impl std::fmt::Debug for FileObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileObjectStore")
            .field("root", &self.inner.root)
            .finish()
    }
}

fn ser(e: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(e.to_string())
}

/// Content keys become file names, so only a conservative alphabet is allowed.
fn validate_name(name: &str) -> StoreResult<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(name.to_string()))
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn encode_photo(photo: &PhotoRecord) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(photo).map_err(ser)?;
    let envelope = PhotoEnvelope {
        checksum: *blake3::hash(&payload).as_bytes(),
        payload,
    };
    bincode::serialize(&envelope).map_err(ser)
}

fn decode_photo(bytes: &[u8], key: &RecordKey) -> StoreResult<PhotoRecord> {
    let corrupt = |reason: String| StoreError::Corrupt {
        key: key.to_string(),
        reason,
    };
    let envelope: PhotoEnvelope =
        bincode::deserialize(bytes).map_err(|e| corrupt(format!("bad envelope: {e}")))?;
    let computed = blake3::hash(&envelope.payload);
    if computed.as_bytes() != &envelope.checksum {
        warn!(%key, "photo record checksum mismatch");
        return Err(corrupt("checksum mismatch".into()));
    }
    let photo: PhotoRecord = bincode::deserialize(&envelope.payload)
        .map_err(|e| corrupt(format!("bad payload: {e}")))?;
    if photo.id.map(RecordKey::Photo).as_ref() != Some(key) {
        return Err(corrupt("record id does not match its file".into()));
    }
    Ok(photo)
}

fn read_record(partition: Partition, path: &Path, key: &RecordKey) -> StoreResult<Record> {
    let bytes = fs::read(path)?;
    match partition {
        Partition::Content => {
            let record: ContentRecord =
                serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(Record::Content(record))
        }
        Partition::Photos => decode_photo(&bytes, key).map(Record::Photo),
    }
}
