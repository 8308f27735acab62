//! In-memory identity to handle map shared by the picker and the I/O layer.

use crate::identity::FileId;
use crate::{PickerError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Maps file identities to live native handles.
///
/// Cloning the registry yields another reference to the same map, so one
/// instance created at startup can be handed to every component that needs it.
/// Entries are never updated in place: they are inserted, overwritten as a
/// whole, or removed.
pub struct HandleRegistry<H> {
    entries: Arc<RwLock<HashMap<FileId, Arc<H>>>>,
}

impl<H> HandleRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // The map holds plain data, so a writer that panicked cannot leave it
    // half-updated; recover the guard instead of propagating poison.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<FileId, Arc<H>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<FileId, Arc<H>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================
    // Registry contract
    // ========================================

    /// Associate `handle` with `id`, replacing any previous association.
    pub fn add_handle(&self, id: FileId, handle: impl Into<Arc<H>>) {
        if self.write().insert(id, handle.into()).is_some() {
            debug!("Replaced native handle for file {}", id);
        } else {
            trace!("Registered native handle for file {}", id);
        }
    }

    /// Drop the association for `id`. Removing an unknown id is a no-op.
    pub fn remove_handle(&self, id: &FileId) {
        if self.write().remove(id).is_some() {
            trace!("Removed native handle for file {}", id);
        }
    }

    /// Look up the handle for `id`.
    ///
    /// Returns the same `Arc` that was added; `None` when nothing is registered.
    pub fn get_handle(&self, id: &FileId) -> Option<Arc<H>> {
        self.read().get(id).cloned()
    }

    // ========================================
    // Helpers for the host and I/O sides
    // ========================================

    /// Mint a fresh identity for `handle` and register it.
    pub fn register(&self, handle: impl Into<Arc<H>>) -> FileId {
        let id = FileId::new();
        self.add_handle(id, handle);
        id
    }

    /// Look up the handle for `id`, treating a miss as a precondition failure.
    ///
    /// Content I/O must use this: a missing handle is never an empty file.
    pub fn require_handle(&self, id: &FileId) -> Result<Arc<H>> {
        self.get_handle(id).ok_or_else(|| PickerError::HandleNotFound {
            id: id.to_string(),
        })
    }

    /// `add_handle` for identities that arrive as text from the host.
    pub fn add_handle_str(&self, id: &str, handle: impl Into<Arc<H>>) -> Result<FileId> {
        let id = FileId::parse(id)?;
        self.add_handle(id, handle);
        Ok(id)
    }

    /// `remove_handle` for textual identities. Unparseable ids match nothing.
    pub fn remove_handle_str(&self, id: &str) {
        if let Ok(id) = FileId::parse(id) {
            self.remove_handle(&id);
        }
    }

    /// `get_handle` for textual identities. Unparseable ids match nothing.
    pub fn get_handle_str(&self, id: &str) -> Option<Arc<H>> {
        FileId::parse(id).ok().and_then(|id| self.get_handle(&id))
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the registered identities, in no particular order.
    pub fn ids(&self) -> Vec<FileId> {
        self.read().keys().copied().collect()
    }
}

impl<H> Default for HandleRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for HandleRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<H> fmt::Debug for HandleRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct FakeHandle(&'static str);

    #[test]
    fn test_add_then_get_returns_same_instance() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let id = FileId::new();
        let handle = Arc::new(FakeHandle("photo.png"));

        registry.add_handle(id, handle.clone());

        let fetched = registry.get_handle(&id).unwrap();
        assert!(Arc::ptr_eq(&handle, &fetched));
    }

    #[test]
    fn test_get_after_remove_is_none() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let id = registry.register(FakeHandle("a"));
        assert!(registry.contains(&id));

        registry.remove_handle(&id);

        assert!(registry.get_handle(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let kept = registry.register(FakeHandle("kept"));

        registry.remove_handle(&FileId::new());
        registry.remove_handle_str("not-an-id");

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&kept));
    }

    #[test]
    fn test_add_overwrites_previous_handle() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let id = FileId::new();

        registry.add_handle(id, FakeHandle("old"));
        registry.add_handle(id, FakeHandle("new"));

        assert_eq!(registry.len(), 1);
        assert_eq!(*registry.get_handle(&id).unwrap(), FakeHandle("new"));
    }

    #[test]
    fn test_register_mints_distinct_ids() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let a = registry.register(FakeHandle("a"));
        let b = registry.register(FakeHandle("b"));

        assert_ne!(a, b);
        let mut ids = registry.ids();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_require_handle_miss_is_error() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let id = FileId::new();

        match registry.require_handle(&id) {
            Err(PickerError::HandleNotFound { id: missing }) => assert_eq!(missing, id.to_string()),
            other => panic!("Expected HandleNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_string_keyed_contract() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let id = registry
            .add_handle_str("11111111-1111-1111-1111-111111111111", FakeHandle("x"))
            .unwrap();

        assert_eq!(id.to_string(), "11111111-1111-1111-1111-111111111111");
        assert!(registry
            .get_handle_str("11111111-1111-1111-1111-111111111111")
            .is_some());
        assert!(registry.get_handle_str("garbage").is_none());
        assert!(registry.add_handle_str("garbage", FakeHandle("y")).is_err());

        registry.remove_handle_str("11111111-1111-1111-1111-111111111111");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let registry: HandleRegistry<FakeHandle> = HandleRegistry::new();
        let other = registry.clone();

        let id = registry.register(FakeHandle("shared"));

        assert!(other.contains(&id));
        other.remove_handle(&id);
        assert!(!registry.contains(&id));
    }
}
