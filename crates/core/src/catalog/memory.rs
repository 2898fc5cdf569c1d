//! In-memory catalog store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Catalog, CatalogError, CatalogStore};
use crate::registry::ChannelRegistry;

/// Catalog store that keeps the document in memory.
///
/// Useful for tests and for embedding the engine without a filesystem.
/// Saves can be made to fail to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: Mutex<Option<Catalog>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already persisted catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(Some(catalog)),
            ..Self::default()
        }
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The currently persisted catalog, if any.
    pub fn persisted(&self) -> Option<Catalog> {
        self.catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self, registry: &ChannelRegistry) -> Catalog {
        let mut catalog = self.persisted().unwrap_or_default();
        catalog.ensure_categories(registry);
        catalog
    }

    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CatalogError::Save {
                path: "memory".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "save disabled"),
            });
        }

        *self
            .catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(catalog.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
