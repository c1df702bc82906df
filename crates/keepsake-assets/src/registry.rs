use std::collections::HashMap;

use keepsake_types::Blob;
use tracing::{debug, trace};
use uuid::Uuid;

/// Scheme prefix of every memory handle URL.
pub const HANDLE_PREFIX: &str = "blob:keepsake/";

/// Tracks the memory handles minted for photo blobs.
///
/// A handle is a process-local URL that resolves to one blob until it is
/// released. The registry owns the blobs; gallery entries only hold the URL.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    handles: HashMap<String, Blob>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `blob` under a freshly minted handle URL.
    pub fn materialize(&mut self, blob: Blob) -> String {
        let url = format!("{HANDLE_PREFIX}{}", Uuid::new_v4());
        trace!(%url, bytes = blob.len(), "materialized handle");
        self.handles.insert(url.clone(), blob);
        url
    }

    /// Release one handle.
    ///
    /// Literal URLs, data URIs and unknown handles are left alone. Returns
    /// `true` if a live handle was released.
    pub fn release(&mut self, url: &str) -> bool {
        if !is_handle(url) {
            return false;
        }
        let released = self.handles.remove(url).is_some();
        if released {
            trace!(%url, "released handle");
        }
        released
    }

    /// Release every live handle.
    pub fn release_all(&mut self) -> usize {
        let count = self.handles.len();
        self.handles.clear();
        if count > 0 {
            debug!(count, "released all handles");
        }
        count
    }

    /// The blob behind a live handle.
    pub fn resolve(&self, url: &str) -> Option<&Blob> {
        self.handles.get(url)
    }

    pub fn live_count(&self) -> usize {
        self.handles.len()
    }
}

/// Returns `true` if `url` has the shape of a memory handle.
pub fn is_handle(url: &str) -> bool {
    url.starts_with(HANDLE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(byte: u8) -> Blob {
        Blob::new("image/jpeg", vec![byte; 4])
    }

    #[test]
    fn materialize_mints_distinct_handles() {
        let mut registry = HandleRegistry::new();
        let a = registry.materialize(blob(1));
        let b = registry.materialize(blob(2));
        assert_ne!(a, b);
        assert!(is_handle(&a));
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.resolve(&b).unwrap().data, vec![2; 4]);
    }

    #[test]
    fn release_is_a_no_op_for_non_handles() {
        let mut registry = HandleRegistry::new();
        registry.materialize(blob(1));
        assert!(!registry.release("assets/images/city.jpg"));
        assert!(!registry.release("data:image/jpeg;base64,AAAA"));
        assert!(!registry.release("blob:keepsake/unknown"));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn release_frees_exactly_one() {
        let mut registry = HandleRegistry::new();
        let a = registry.materialize(blob(1));
        registry.materialize(blob(2));
        assert!(registry.release(&a));
        assert!(!registry.release(&a));
        assert!(registry.resolve(&a).is_none());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn release_all_empties_registry() {
        let mut registry = HandleRegistry::new();
        registry.materialize(blob(1));
        registry.materialize(blob(2));
        assert_eq!(registry.release_all(), 2);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.release_all(), 0);
    }
}
