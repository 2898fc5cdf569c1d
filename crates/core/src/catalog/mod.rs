//! Video catalog - the persisted, per-channel rolling list of recent videos.
//!
//! The catalog is loaded once at the start of a sync pass, rebuilt by the
//! sync engine, and written back in full at the end.

mod json_store;
mod memory;
mod types;

pub use json_store::{parse_catalog, JsonFileStore, ParsedCatalog};
pub use memory::MemoryStore;
pub use types::*;

use crate::registry::ChannelRegistry;

/// Trait for catalog persistence.
pub trait CatalogStore: Send + Sync {
    /// Load the persisted catalog.
    ///
    /// Never fails: a missing, unreadable or malformed document yields an
    /// empty catalog. Every registry category is present in the result.
    fn load(&self, registry: &ChannelRegistry) -> Catalog;

    /// Persist the full catalog, replacing the previous document.
    ///
    /// On failure the previously persisted document must remain intact.
    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError>;

    /// Human readable location of the store, for logs.
    fn location(&self) -> String;
}
