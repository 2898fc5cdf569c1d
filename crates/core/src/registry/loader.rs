use std::path::Path;

use super::{ChannelRegistry, RegistryError};

/// Load the registry document from disk.
///
/// Unlike the catalog, the registry is required input: a missing or
/// malformed document is an error.
pub fn load_registry(path: &Path) -> Result<ChannelRegistry, RegistryError> {
    if !path.exists() {
        return Err(RegistryError::NotFound(path.display().to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    parse_registry(&raw)
}

/// Parse and validate a registry document.
pub fn parse_registry(raw: &str) -> Result<ChannelRegistry, RegistryError> {
    let registry: ChannelRegistry =
        serde_json::from_str(raw).map_err(|e| RegistryError::Parse(e.to_string()))?;

    for entry in registry.entries() {
        if entry.reference.trim().is_empty() {
            return Err(RegistryError::Invalid(format!(
                "channel '{}' in category '{}' has an empty reference",
                entry.display_name, entry.category
            )));
        }
    }

    Ok(registry)
}
