//! JSON export and import of the document's persisted form.

use keepsake_schema::{defaults, reconcile};
use keepsake_store::{ObjectStore, PreferenceStore};
use serde_json::Value;
use tracing::info;

use crate::controller::Keepsake;
use crate::error::CoreResult;

impl<S: ObjectStore, P: PreferenceStore> Keepsake<S, P> {
    /// Pretty JSON of the document as it would be saved: no photo gallery,
    /// no display name.
    pub fn export_json(&self) -> CoreResult<String> {
        let value = self.document().persisted_form()?;
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Replace the document with an exported one, reconciled against the
    /// defaults.
    ///
    /// The current gallery projection and display name are kept, since
    /// neither is part of an export. Nothing is persisted until `save`.
    pub fn import_json(&mut self, json: &str) -> CoreResult<()> {
        let value: Value = serde_json::from_str(json)?;
        let mut document = reconcile(defaults(), Some(&value))?;
        document.photo_gallery = self.document().photo_gallery.clone();
        document.display_name = self.document().display_name.clone();
        self.replace_document(document);
        info!("imported document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use keepsake_store::{InMemoryObjectStore, InMemoryPreferences};
    use serde_json::json;

    use super::*;
    use crate::config::SiteConfig;
    use crate::error::CoreError;

    fn keepsake() -> Keepsake<InMemoryObjectStore, InMemoryPreferences> {
        Keepsake::new(
            InMemoryObjectStore::new(),
            InMemoryPreferences::new(),
            SiteConfig::default(),
        )
    }

    #[tokio::test]
    async fn export_omits_gallery_and_name() {
        let mut ks = keepsake();
        ks.load().await.unwrap();
        let exported: Value = serde_json::from_str(&ks.export_json().unwrap()).unwrap();
        assert!(exported.get("photoGallery").is_none());
        assert!(exported.get("SpouseName").is_none());
        assert_eq!(exported["homepage"], ks.document().to_value().unwrap()["homepage"]);
    }

    #[tokio::test]
    async fn import_restores_export() {
        let mut ks = keepsake();
        ks.load().await.unwrap();
        ks.document_mut().surprise.title = "exported".into();
        let exported = ks.export_json().unwrap();

        ks.document_mut().surprise.title = "changed".into();
        let gallery = ks.document().photo_gallery.clone();
        ks.import_json(&exported).unwrap();

        assert_eq!(ks.document().surprise.title, "exported");
        assert_eq!(ks.document().photo_gallery, gallery);
        assert_eq!(ks.document().display_name.as_deref(), Some("My Love"));
    }

    #[test]
    fn partial_import_is_filled_from_defaults() {
        let mut ks = keepsake();
        let partial = json!({ "playlist": { "intro": "ours" } }).to_string();
        ks.import_json(&partial).unwrap();
        assert_eq!(ks.document().playlist.intro, "ours");
        assert_eq!(ks.document().playlist.songs, defaults().playlist.songs);
        assert_eq!(ks.document().events, defaults().events);
    }

    #[test]
    fn malformed_import_leaves_document() {
        let mut ks = keepsake();
        let before = ks.document().clone();
        assert!(matches!(ks.import_json("{ nope"), Err(CoreError::Json(_))));
        assert!(matches!(
            ks.import_json(r#"{ "events": "not a list" }"#),
            Err(CoreError::Schema(_))
        ));
        assert_eq!(ks.document(), &before);
    }
}
