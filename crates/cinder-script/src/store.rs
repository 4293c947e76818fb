//! Shared handle to the entity store used by script bindings

use cinder_ecs::EntityStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A cloneable handle to one [`EntityStore`].
///
/// Every binding closure captures its own clone at registration time, so
/// two engines can drive two different stores side by side.
#[derive(Clone, Default)]
pub struct StoreHandle(Arc<Mutex<EntityStore>>);

impl StoreHandle {
    pub fn new(store: EntityStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Lock the store for the duration of one call. Poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, EntityStore> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the store locked
    pub fn with<R>(&self, f: impl FnOnce(&mut EntityStore) -> R) -> R {
        f(&mut self.lock())
    }
}

impl From<EntityStore> for StoreHandle {
    fn from(store: EntityStore) -> Self {
        Self::new(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_one_store() {
        let handle = StoreHandle::default();
        let other = handle.clone();
        let id = handle.with(|store| store.create_entity());
        assert!(other.lock().contains(id));
    }

    #[test]
    fn test_separate_handles_are_separate_stores() {
        let a = StoreHandle::new(EntityStore::new());
        let b = StoreHandle::new(EntityStore::new());
        let id = a.with(|store| store.create_entity());
        assert!(!b.lock().contains(id));
    }
}
