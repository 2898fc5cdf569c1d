//! JSON file backed catalog store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::{dedup_by_key, Catalog, CatalogError, CatalogStore, VideoRecord};
use crate::registry::ChannelRegistry;

/// Catalog stored as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

/// Result of parsing a catalog document, with what had to be repaired.
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub catalog: Catalog,
    /// Records that could not be read as video records and were dropped.
    pub dropped_records: usize,
    /// Records whose missing id was recovered from their URL.
    pub recovered_ids: usize,
    /// Later duplicates of an id within one channel list.
    pub duplicate_records: usize,
}

type RawDocument = IndexMap<String, IndexMap<String, Vec<serde_json::Value>>>;

/// Parse a catalog document.
///
/// The category -> channel -> list shape is mandatory; individual records
/// that do not deserialize are dropped rather than failing the document.
pub fn parse_catalog(bytes: &[u8]) -> Result<ParsedCatalog, CatalogError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CatalogError::Malformed("document is empty".to_string()));
    }

    let raw: RawDocument =
        serde_json::from_slice(bytes).map_err(|e| CatalogError::Malformed(e.to_string()))?;

    let mut parsed = ParsedCatalog::default();
    for (category, channels) in raw {
        parsed.catalog.insert_category(category.clone());
        for (channel, values) in channels {
            let mut videos = Vec::with_capacity(values.len());
            for value in values {
                match serde_json::from_value::<VideoRecord>(value) {
                    Ok(mut video) => {
                        if video.recover_id() {
                            parsed.recovered_ids += 1;
                        }
                        videos.push(video);
                    }
                    Err(e) => {
                        debug!(category = %category, channel = %channel, error = %e, "Dropping unreadable record");
                        parsed.dropped_records += 1;
                    }
                }
            }
            parsed.duplicate_records += dedup_by_key(&mut videos);
            parsed.catalog.set_channel(category.clone(), channel, videos);
        }
    }

    Ok(parsed)
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document, reporting why it could not be used.
    pub fn read(&self) -> Result<ParsedCatalog, CatalogError> {
        if !self.path.exists() {
            return Err(CatalogError::NotFound(self.path.display().to_string()));
        }
        let bytes = fs::read(&self.path)?;
        parse_catalog(&bytes)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog.json".to_string());
        self.path.with_file_name(format!("{file_name}.tmp"))
    }

    fn write_atomically(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        let result = (|| {
            let mut file = File::create(&tmp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp_path, &self.path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self, registry: &ChannelRegistry) -> Catalog {
        let mut catalog = match self.read() {
            Ok(parsed) => {
                if parsed.dropped_records > 0 || parsed.duplicate_records > 0 {
                    warn!(
                        path = %self.path.display(),
                        dropped = parsed.dropped_records,
                        duplicates = parsed.duplicate_records,
                        "Catalog contained unusable records"
                    );
                }
                if parsed.recovered_ids > 0 {
                    info!(
                        recovered = parsed.recovered_ids,
                        "Recovered video ids from legacy records"
                    );
                }
                parsed.catalog
            }
            Err(CatalogError::NotFound(path)) => {
                info!("No catalog at {}, starting empty", path);
                Catalog::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Catalog unusable, starting empty");
                Catalog::new()
            }
        };

        catalog.ensure_categories(registry);
        catalog
    }

    fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let mut bytes = serde_json::to_vec_pretty(catalog)?;
        bytes.push(b'\n');

        self.write_atomically(&bytes)
            .map_err(|source| CatalogError::Save {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Catalog saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::watch_url;
    use tempfile::TempDir;

    fn registry() -> ChannelRegistry {
        let mut registry = ChannelRegistry::new();
        registry.insert("ingles", "Tabletop", "https://www.youtube.com/@tabletop");
        registry.insert_category("espanol");
        registry
    }

    fn record(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {id}"),
            url: watch_url(id),
            thumbnail: Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
            channel_name: "Tabletop".to_string(),
            channel_url: "https://www.youtube.com/@tabletop".to_string(),
            fetched_at: None,
            duration: Some(600.0),
            upload_date: Some("20240102".to_string()),
            view_count: Some(42),
        }
    }

    fn assert_default(catalog: &Catalog) {
        let names: Vec<_> = catalog.categories().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["ingles", "espanol"]);
        assert_eq!(catalog.channel_count(), 0);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("videos.json"));
        assert_default(&store.load(&registry()));
    }

    #[test]
    fn test_load_empty_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        fs::write(&path, "  \n").unwrap();
        assert_default(&JsonFileStore::new(&path).load(&registry()));
    }

    #[test]
    fn test_load_corrupt_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        fs::write(&path, "{\"ingles\": {\"Tabletop\": [").unwrap();
        assert_default(&JsonFileStore::new(&path).load(&registry()));
    }

    #[test]
    fn test_load_wrong_shape_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        fs::write(&path, r#"{"ingles": ["flat", "list"]}"#).unwrap();
        assert_default(&JsonFileStore::new(&path).load(&registry()));

        fs::write(&path, r#"[1, 2, 3]"#).unwrap();
        assert_default(&JsonFileStore::new(&path).load(&registry()));
    }

    #[test]
    fn test_save_then_load_preserves_order_and_fields() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("videos.json"));

        let mut catalog = Catalog::with_categories(&registry());
        catalog.set_channel("ingles", "Tabletop", vec![record("v3"), record("v2"), record("v1")]);
        store.save(&catalog).unwrap();

        let loaded = store.load(&registry());
        assert_eq!(loaded, catalog);
        let ids: Vec<_> = loaded
            .channel("ingles", "Tabletop")
            .unwrap()
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["v3", "v2", "v1"]);
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("videos.json");
        let store = JsonFileStore::new(&path);

        store.save(&Catalog::with_categories(&registry())).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("videos.json.tmp").exists());
    }

    #[test]
    fn test_save_keeps_non_ascii_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        let store = JsonFileStore::new(&path);

        let mut video = record("v1");
        video.title = "Análisis Parálisis".to_string();
        let mut catalog = Catalog::new();
        catalog.set_channel("espanol", "Análisis Parálisis", vec![video]);
        store.save(&catalog).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Análisis Parálisis"));
    }

    #[test]
    fn test_failed_save_keeps_previous_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        let store = JsonFileStore::new(&path);

        let mut catalog = Catalog::with_categories(&registry());
        catalog.set_channel("ingles", "Tabletop", vec![record("v1")]);
        store.save(&catalog).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(dir.path().join("videos.json.tmp")).unwrap();
        catalog.set_channel("ingles", "Tabletop", vec![record("v2"), record("v1")]);
        let result = store.save(&catalog);

        assert!(matches!(result, Err(CatalogError::Save { .. })));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_parse_drops_unreadable_records_and_duplicates() {
        let doc = r#"{
            "ingles": {
                "Tabletop": [
                    {"id": "a", "title": "first"},
                    "not a record",
                    {"id": "a", "title": "second"},
                    {"titulo": "legacy", "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}
                ]
            }
        }"#;
        let parsed = parse_catalog(doc.as_bytes()).unwrap();
        assert_eq!(parsed.dropped_records, 1);
        assert_eq!(parsed.duplicate_records, 1);
        assert_eq!(parsed.recovered_ids, 1);

        let videos = parsed.catalog.channel("ingles", "Tabletop").unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "first");
        assert_eq!(videos[1].id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_load_keeps_unregistered_categories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");
        fs::write(&path, r#"{"archivo": {"Old": [{"id": "x"}]}}"#).unwrap();

        let catalog = JsonFileStore::new(&path).load(&registry());
        assert_eq!(catalog.channel("archivo", "Old").unwrap().len(), 1);
        assert!(catalog.category("ingles").is_some());
        assert!(catalog.category("espanol").is_some());
    }
}
