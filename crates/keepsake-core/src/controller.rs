use keepsake_assets::{compress_async, upload_inline_image, HandleRegistry, ImageConstraints};
use keepsake_schema::{defaults, reconcile};
use keepsake_store::{
    FileObjectStore, FilePreferences, ObjectStore, Partition, PreferenceStore, Record, StoreError,
    StoreResult, EDIT_MODE_KEY, THEME_KEY,
};
use keepsake_types::{
    Blob, ContentRecord, Document, GalleryEntry, PhotoId, PhotoRecord, RecordKey,
    CONTENT_RECORD_ID,
};
use tracing::{debug, error, info, warn};

use crate::config::SiteConfig;
use crate::error::{CoreError, CoreResult};

/// Whether the controller may write content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Health {
    Ok,
    /// A load or save hit a storage failure. Saves are refused until the
    /// next successful load.
    Failed,
}

/// Result of a [`Keepsake::save`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl SaveOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// The live document of one session and everything needed to persist it.
///
/// All mutation goes through `&mut self`, so there is exactly one writer.
pub struct Keepsake<S, P> {
    store: S,
    prefs: P,
    config: SiteConfig,
    document: Document,
    handles: HandleRegistry,
    health: Health,
}

impl Keepsake<FileObjectStore, FilePreferences> {
    /// Open the on-disk store and preference file under `config.data_dir`.
    pub async fn open(config: SiteConfig) -> CoreResult<Self> {
        let store = FileObjectStore::open(config.store_dir()).await?;
        let prefs = FilePreferences::open(config.preferences_path())?;
        Ok(Self::new(store, prefs, config))
    }
}

impl<S: ObjectStore, P: PreferenceStore> Keepsake<S, P> {
    /// Create a controller holding the default document. Call
    /// [`load`](Self::load) to bring in persisted state.
    pub fn new(store: S, prefs: P, config: SiteConfig) -> Self {
        let mut document = defaults();
        document.display_name = Some(config.spouse_name.clone());
        Self {
            store,
            prefs,
            config,
            document,
            handles: HandleRegistry::new(),
            health: Health::Ok,
        }
    }

    // ---- Load / save ----

    /// Rebuild the live document from the store.
    ///
    /// On a first run (no content record) one photo record is seeded per
    /// default gallery photo and the defaults are persisted. The content
    /// record is written last, so a run interrupted before it is retried from
    /// a cleared photo partition on the next load. Any failure marks
    /// the controller [`Health::Failed`] and leaves the current document in
    /// place.
    pub async fn load(&mut self) -> CoreResult<()> {
        match self.try_load().await {
            Ok(document) => {
                self.document = document;
                self.health = Health::Ok;
                info!(
                    photos = self.document.photo_count(),
                    handles = self.handles.live_count(),
                    "loaded document"
                );
                Ok(())
            }
            Err(e) => {
                self.health = Health::Failed;
                error!(error = %e, "load failed");
                Err(e)
            }
        }
    }

    async fn try_load(&mut self) -> CoreResult<Document> {
        let main = RecordKey::name(CONTENT_RECORD_ID);
        let (content, photos) = tokio::try_join!(
            self.store.get(Partition::Content, &main),
            self.store.get_all(Partition::Photos),
        )?;
        let content = content.map(Record::into_content).transpose()?;
        let photos = photos
            .into_iter()
            .map(Record::into_photo)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut document = reconcile(defaults(), content.as_ref().map(|c| &c.content))?;
        let photos = match content {
            Some(_) => photos,
            None => {
                info!("no stored content, initializing store with defaults");
                if !photos.is_empty() {
                    warn!(count = photos.len(), "discarding photos from an unfinished first run");
                }
                self.store.clear(Partition::Photos).await?;
                let seeded = self.seed_photos(&document.photo_gallery).await?;
                let record = ContentRecord::main(document.persisted_form()?);
                self.store.put(Partition::Content, record.into()).await?;
                seeded
            }
        };

        self.handles.release_all();
        document.photo_gallery = self.project(photos);
        document.display_name = Some(self.config.spouse_name.clone());
        Ok(document)
    }

    async fn seed_photos(&self, gallery: &[GalleryEntry]) -> CoreResult<Vec<PhotoRecord>> {
        let mut seeded = Vec::with_capacity(gallery.len());
        for entry in gallery {
            let mut record =
                PhotoRecord::from_url(entry.image.clone(), entry.caption.clone().unwrap_or_default());
            let key = self.store.put(Partition::Photos, record.clone().into()).await?;
            record.id = Some(photo_id(&key)?);
            seeded.push(record);
        }
        info!(count = seeded.len(), "seeded default photos");
        Ok(seeded)
    }

    /// Gallery entries newest first, minting a handle per blob-backed record.
    fn project(&mut self, mut photos: Vec<PhotoRecord>) -> Vec<GalleryEntry> {
        photos.sort_by(|a, b| b.id.cmp(&a.id));
        photos
            .into_iter()
            .map(|record| {
                let image = match record.blob {
                    Some(blob) => self.handles.materialize(blob),
                    None => record.url.unwrap_or_default(),
                };
                GalleryEntry {
                    id: record.id,
                    image,
                    caption: non_empty(&record.caption),
                }
            })
            .collect()
    }

    /// Persist the document, minus gallery and display name, as the content
    /// record.
    ///
    /// Never fails outright: errors are reported in the outcome. While the
    /// controller is [`Health::Failed`] nothing is written.
    pub async fn save(&mut self, silent: bool) -> SaveOutcome {
        if self.health == Health::Failed {
            warn!("save refused: storage is in a failed state, reload first");
            return SaveOutcome::failed("storage is in a failed state; reload before saving");
        }

        let result = async {
            let record = ContentRecord::main(self.document.persisted_form()?);
            self.store.put(Partition::Content, record.into()).await?;
            Ok::<_, CoreError>(())
        }
        .await;

        match result {
            Ok(()) => {
                if silent {
                    debug!("saved content");
                } else {
                    info!("changes saved to device");
                }
                SaveOutcome::ok()
            }
            Err(e) => {
                if matches!(e, CoreError::Store(_)) {
                    self.health = Health::Failed;
                }
                error!(error = %e, "save failed");
                SaveOutcome::failed(e.to_string())
            }
        }
    }

    // ---- Photos ----

    /// Compress and store a new photo, then show it first in the gallery.
    pub async fn add_photo(&mut self, bytes: &[u8], caption: &str) -> CoreResult<PhotoId> {
        let blob = compress_async(bytes.to_vec(), ImageConstraints::GALLERY).await?;
        let record = PhotoRecord::from_blob(blob.clone(), caption);
        let key = self.store.put(Partition::Photos, record.into()).await?;
        let id = photo_id(&key)?;

        let image = self.handles.materialize(blob);
        self.document.photo_gallery.insert(
            0,
            GalleryEntry {
                id: Some(id),
                image,
                caption: non_empty(caption),
            },
        );
        info!(%id, "added photo");
        Ok(id)
    }

    /// Change the caption of the entry at `index`, optionally replacing its
    /// image.
    ///
    /// An entry without a stored record only has its in-memory caption
    /// updated.
    pub async fn update_photo(
        &mut self,
        index: usize,
        caption: &str,
        new_file: Option<&[u8]>,
    ) -> CoreResult<()> {
        let entry = self.entry(index)?.clone();
        let record = match entry.id {
            Some(id) => self
                .store
                .get(Partition::Photos, &RecordKey::Photo(id))
                .await?
                .map(Record::into_photo)
                .transpose()?,
            None => None,
        };

        match record {
            Some(mut record) => {
                record.caption = caption.to_string();
                let replacement = match new_file {
                    Some(bytes) => {
                        Some(compress_async(bytes.to_vec(), ImageConstraints::GALLERY).await?)
                    }
                    None => None,
                };
                if let Some(blob) = &replacement {
                    record.replace_blob(blob.clone());
                }
                self.store.put(Partition::Photos, record.into()).await?;

                if let Some(blob) = replacement {
                    self.handles.release(&entry.image);
                    self.document.photo_gallery[index].image = self.handles.materialize(blob);
                }
            }
            None => warn!(index, "no stored record behind gallery entry, updating caption only"),
        }

        self.document.photo_gallery[index].caption = non_empty(caption);
        debug!(index, replaced = new_file.is_some(), "updated photo");
        Ok(())
    }

    /// Remove the entry at `index` and its stored record.
    pub async fn delete_photo(&mut self, index: usize) -> CoreResult<GalleryEntry> {
        let id = self.entry(index)?.id;
        if let Some(id) = id {
            self.store.delete(Partition::Photos, &RecordKey::Photo(id)).await?;
        }
        let entry = self.document.photo_gallery.remove(index);
        self.handles.release(&entry.image);
        info!(index, "deleted photo");
        Ok(entry)
    }

    fn entry(&self, index: usize) -> CoreResult<&GalleryEntry> {
        self.document
            .photo_gallery
            .get(index)
            .ok_or(CoreError::PhotoIndex {
                index,
                len: self.document.photo_gallery.len(),
            })
    }

    // ---- Reset ----

    /// Erase all stored content, photos and preference flags. The next
    /// [`load`](Self::load) behaves like a first run.
    pub async fn reset_all(&mut self) -> CoreResult<()> {
        self.store.clear_all(&Partition::ALL).await?;
        self.handles.release_all();
        self.document.photo_gallery.clear();
        self.prefs.remove(THEME_KEY)?;
        self.prefs.remove(EDIT_MODE_KEY)?;
        info!("reset all data");
        Ok(())
    }

    // ---- Preferences ----

    /// Stored theme, falling back to the configured one.
    pub fn theme(&self) -> CoreResult<String> {
        Ok(self
            .prefs
            .get(THEME_KEY)?
            .unwrap_or_else(|| self.config.theme.clone()))
    }

    pub fn set_theme(&self, theme: &str) -> CoreResult<()> {
        Ok(self.prefs.set(THEME_KEY, theme)?)
    }

    pub fn edit_mode(&self) -> CoreResult<bool> {
        Ok(self.prefs.get(EDIT_MODE_KEY)?.as_deref() == Some("true"))
    }

    pub fn set_edit_mode(&self, on: bool) -> CoreResult<()> {
        Ok(self.prefs.set(EDIT_MODE_KEY, if on { "true" } else { "false" })?)
    }

    // ---- Document access ----

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Swap in a whole new document. Nothing is persisted until
    /// [`save`](Self::save).
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
    }

    /// Compress an image for a text field and return it as a data URI.
    pub async fn upload_inline_image(&self, bytes: &[u8]) -> CoreResult<String> {
        Ok(upload_inline_image(bytes.to_vec()).await?)
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn live_handles(&self) -> usize {
        self.handles.live_count()
    }

    /// The blob behind a gallery image, if it is a live handle.
    pub fn resolve_image(&self, url: &str) -> Option<&Blob> {
        self.handles.resolve(url)
    }
}

fn photo_id(key: &RecordKey) -> CoreResult<PhotoId> {
    key.as_photo()
        .ok_or_else(|| StoreError::InvalidKey(format!("{key} is not a photo key")).into())
}

fn non_empty(caption: &str) -> Option<String> {
    (!caption.is_empty()).then(|| caption.to_string())
}
