//! Section-aware reconciliation of persisted content against the defaults.
//!
//! Persisted records may predate sections introduced later. Reconciling walks
//! the stored object key by key: known sections are merged into the default
//! tree and shape-checked against their type, unknown keys are merged through
//! untouched, and the result is decoded into a typed [`Document`].

use keepsake_types::{
    BucketList, Document, Event, GalleryEntry, Homepage, LoveLanguages, LoveReasons, MemoryEntry,
    Note, Playlist, Promises, Section, Surprise, VideoMontage,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SchemaError, SchemaResult};
use crate::merge::merge_entry;

/// Merge `persisted` content over `defaults`.
///
/// `None`, `null` and `{}` all yield the defaults unchanged. List sections are
/// replaced wholesale; composite sections merge key by key.
pub fn reconcile(defaults: Document, persisted: Option<&Value>) -> SchemaResult<Document> {
    let stored = match persisted {
        None | Some(Value::Null) => return Ok(defaults),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(SchemaError::NotAnObject(json_kind(other))),
    };
    if stored.is_empty() {
        return Ok(defaults);
    }

    let mut base = defaults.to_value()?;
    let base_map = base
        .as_object_mut()
        .ok_or(SchemaError::NotAnObject("non-object defaults"))?;

    for (key, value) in stored {
        match Section::from_key(key) {
            Some(section) => {
                if section.is_list() {
                    base_map.insert(key.clone(), value.clone());
                } else {
                    merge_entry(base_map, key, value);
                }
                if let Some(merged) = base_map.get(key) {
                    check_section(section, merged).map_err(|source| {
                        warn!(%section, error = %source, "persisted section failed shape check");
                        SchemaError::Section { section, source }
                    })?;
                }
                debug!(%section, "reconciled persisted section");
            }
            None => {
                debug!(key = %key, "carrying unknown top-level key");
                merge_entry(base_map, key, value);
            }
        }
    }

    Ok(Document::from_value(base)?)
}

/// Decode a section value into its typed shape, discarding the result.
fn check_section(section: Section, value: &Value) -> Result<(), serde_json::Error> {
    match section {
        Section::Homepage => Homepage::deserialize(value).map(drop),
        Section::Events => Vec::<Event>::deserialize(value).map(drop),
        Section::Notes => Vec::<Note>::deserialize(value).map(drop),
        Section::PhotoGallery => Vec::<GalleryEntry>::deserialize(value).map(drop),
        Section::Promises => Promises::deserialize(value).map(drop),
        Section::LoveReasons => LoveReasons::deserialize(value).map(drop),
        Section::LoveLanguages => LoveLanguages::deserialize(value).map(drop),
        Section::BucketList => BucketList::deserialize(value).map(drop),
        Section::MemoryBook => Vec::<MemoryEntry>::deserialize(value).map(drop),
        Section::Playlist => Playlist::deserialize(value).map(drop),
        Section::VideoMontage => VideoMontage::deserialize(value).map(drop),
        Section::Surprise => Surprise::deserialize(value).map(drop),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::defaults;
    use serde_json::json;

    #[test]
    fn absent_record_yields_defaults() {
        assert_eq!(reconcile(defaults(), None).unwrap(), defaults());
        assert_eq!(reconcile(defaults(), Some(&Value::Null)).unwrap(), defaults());
        assert_eq!(reconcile(defaults(), Some(&json!({}))).unwrap(), defaults());
    }

    #[test]
    fn user_edits_win_over_defaults() {
        let stored = json!({
            "homepage": { "relationshipTag": "Partner in Crime" },
            "notes": [{ "date": "2030-01-01", "text": "only note" }]
        });
        let doc = reconcile(defaults(), Some(&stored)).unwrap();
        assert_eq!(doc.homepage.relationship_tag, "Partner in Crime");
        // Untouched composite fields keep their defaults.
        assert_eq!(doc.homepage.main_image, defaults().homepage.main_image);
        // Lists are replaced, not interleaved.
        assert_eq!(doc.notes.len(), 1);
        assert_eq!(doc.notes[0].text, "only note");
    }

    #[test]
    fn sections_missing_from_old_records_are_backfilled() {
        let stored = json!({ "events": [] });
        let doc = reconcile(defaults(), Some(&stored)).unwrap();
        assert!(doc.events.is_empty());
        assert_eq!(doc.surprise, defaults().surprise);
        assert_eq!(doc.bucket_list, defaults().bucket_list);
    }

    #[test]
    fn nested_lists_inside_composites_are_atomic() {
        let stored = json!({ "promises": { "promises": ["just one"] } });
        let doc = reconcile(defaults(), Some(&stored)).unwrap();
        assert_eq!(doc.promises.promises, vec!["just one".to_string()]);
        assert_eq!(doc.promises.intro, defaults().promises.intro);
    }

    #[test]
    fn unknown_keys_survive() {
        let stored = json!({ "anniversaryPlans": { "venue": "lake" } });
        let doc = reconcile(defaults(), Some(&stored)).unwrap();
        assert_eq!(doc.extra["anniversaryPlans"], json!({ "venue": "lake" }));
    }

    #[test]
    fn malformed_section_is_reported() {
        let stored = json!({ "events": { "not": "a list" } });
        let err = reconcile(defaults(), Some(&stored)).unwrap_err();
        match err {
            SchemaError::Section { section, .. } => assert_eq!(section, Section::Events),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = reconcile(defaults(), Some(&json!([1, 2]))).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject("array")));
    }

    #[test]
    fn reconcile_is_idempotent_over_documents() {
        let stored = json!({
            "homepage": { "introMessage": "hello" },
            "surprise": { "wheelItems": ["Hug"] }
        });
        let once = reconcile(defaults(), Some(&stored)).unwrap();
        let twice = reconcile(once.clone(), Some(&stored)).unwrap();
        assert_eq!(once, twice);
    }
}
