//! Channel registry - the curated list of channels, grouped by language category.
//!
//! The registry is an explicit value handed to the sync engine and the
//! renderers. It is read-only input; nothing in this crate mutates it after
//! loading.

mod loader;

pub use loader::{load_registry, parse_registry};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name -> channel reference, in document order.
pub type CategoryChannels = IndexMap<String, String>;

/// Ordered mapping from category to its channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelRegistry {
    categories: IndexMap<String, CategoryChannels>,
}

/// A single registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry<'a> {
    pub category: &'a str,
    pub display_name: &'a str,
    pub reference: &'a str,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel, creating the category when needed.
    pub fn insert(
        &mut self,
        category: impl Into<String>,
        display_name: impl Into<String>,
        reference: impl Into<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(display_name.into(), reference.into());
    }

    /// Register a category with no channels.
    pub fn insert_category(&mut self, category: impl Into<String>) {
        self.categories.entry(category.into()).or_default();
    }

    /// Category names in registry order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Channels of one category, if the category exists.
    pub fn channels(&self, category: &str) -> Option<&CategoryChannels> {
        self.categories.get(category)
    }

    /// Every registered channel, category by category.
    pub fn entries(&self) -> impl Iterator<Item = RegistryEntry<'_>> {
        self.categories.iter().flat_map(|(category, channels)| {
            channels
                .iter()
                .map(move |(display_name, reference)| RegistryEntry {
                    category,
                    display_name,
                    reference,
                })
        })
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn channel_count(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Errors for registry loading.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry file not found: {0}")]
    NotFound(String),

    #[error("Failed to read registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse registry: {0}")]
    Parse(String),

    #[error("Invalid registry: {0}")]
    Invalid(String),
}
