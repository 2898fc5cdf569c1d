//! Types for the video catalog.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::registry::ChannelRegistry;

static VIDEO_ID_IN_URL: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/shorts/)([A-Za-z0-9_-]{11})")
        .ok()
});

/// Canonical watch link for a video id.
pub fn watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// Extract a video id from a watch, short or shorts link.
pub fn video_id_from_url(url: &str) -> Option<String> {
    VIDEO_ID_IN_URL
        .as_ref()?
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// One video known for one channel.
///
/// Records are never mutated once captured; a sync pass only prepends new
/// ones and drops the oldest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Platform video id, the reconciliation key. Empty for legacy records
    /// whose id could not be recovered.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(default, alias = "titulo", deserialize_with = "nullable_string")]
    pub title: String,
    /// Canonical watch link.
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Channel name as resolved by the fetch (may differ from the registry key).
    #[serde(default, deserialize_with = "nullable_string")]
    pub channel_name: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub channel_url: String,
    /// Capture time. Absent on records written before it was tracked.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub fetched_at: Option<DateTime<Utc>>,
    /// Duration in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Upload date as `YYYYMMDD`.
    #[serde(
        default,
        alias = "fecha_subida",
        skip_serializing_if = "Option::is_none"
    )]
    pub upload_date: Option<String>,
    #[serde(
        default,
        alias = "visualizaciones",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_count: Option<u64>,
}

impl VideoRecord {
    /// The id usable for deduplication, if any.
    pub fn key(&self) -> Option<&str> {
        let id = self.id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    /// Fill an empty id from the watch URL. Returns true when recovered.
    pub fn recover_id(&mut self) -> bool {
        if self.key().is_some() {
            return false;
        }
        match video_id_from_url(&self.url) {
            Some(id) => {
                self.id = id;
                true
            }
            None => false,
        }
    }
}

/// Explicit `null` reads as an empty string.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 timestamps as well as naive ISO-8601 ones (read as UTC).
/// Anything else becomes `None` instead of failing the record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::String(raw)) = value else {
        return Ok(None);
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Newest-first list of videos for one channel.
pub type ChannelVideos = Vec<VideoRecord>;

/// Channel name -> videos, in insertion order.
pub type CategoryVideos = IndexMap<String, ChannelVideos>;

/// Category -> channel -> newest-first videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    categories: IndexMap<String, CategoryVideos>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty catalog with every registry category present.
    pub fn with_categories(registry: &ChannelRegistry) -> Self {
        let mut catalog = Self::new();
        catalog.ensure_categories(registry);
        catalog
    }

    /// Add any registry category that is missing, mapped to no channels.
    pub fn ensure_categories(&mut self, registry: &ChannelRegistry) {
        for category in registry.categories() {
            self.categories.entry(category.to_string()).or_default();
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &CategoryVideos)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn category(&self, category: &str) -> Option<&CategoryVideos> {
        self.categories.get(category)
    }

    /// Videos of one channel; `None` when the channel was never stored.
    pub fn channel(&self, category: &str, channel: &str) -> Option<&[VideoRecord]> {
        self.categories
            .get(category)
            .and_then(|channels| channels.get(channel))
            .map(Vec::as_slice)
    }

    /// Replace a channel's list, creating the category when needed.
    pub fn set_channel(
        &mut self,
        category: impl Into<String>,
        channel: impl Into<String>,
        videos: ChannelVideos,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(channel.into(), videos);
    }

    pub fn insert_category(&mut self, category: impl Into<String>) {
        self.categories.entry(category.into()).or_default();
    }

    pub fn channel_count(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }

    pub fn video_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let newest_fetched_at = self
            .categories
            .values()
            .flat_map(IndexMap::values)
            .flatten()
            .filter_map(|v| v.fetched_at)
            .max();

        CatalogStats {
            categories: self.categories.len(),
            channels: self.channel_count(),
            videos: self.video_count(),
            newest_fetched_at,
        }
    }
}

/// Drop later duplicates of an id, keeping the first (newest) occurrence.
/// Records without a key are never treated as duplicates.
pub fn dedup_by_key(videos: &mut ChannelVideos) -> usize {
    let before = videos.len();
    let mut seen = HashSet::new();
    videos.retain(|v| match v.key() {
        Some(key) => seen.insert(key.to_string()),
        None => true,
    });
    before - videos.len()
}

/// Catalog statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub categories: usize,
    pub channels: usize,
    pub videos: usize,
    /// Most recent capture time across all records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_fetched_at: Option<DateTime<Utc>>,
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog document not found: {0}")]
    NotFound(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog document: {0}")]
    Malformed(String),

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to save catalog to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {id}"),
            url: watch_url(id),
            thumbnail: None,
            channel_name: "Channel".to_string(),
            channel_url: "https://www.youtube.com/@Channel".to_string(),
            fetched_at: None,
            duration: None,
            upload_date: None,
            view_count: None,
        }
    }

    #[test]
    fn test_video_id_from_url_variants() {
        assert_eq!(
            video_id_from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id_from_url("https://www.youtube.com/watch?feature=share&v=jNQXAC9IVRw").as_deref(),
            Some("jNQXAC9IVRw")
        );
        assert_eq!(
            video_id_from_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id_from_url("https://www.youtube.com/@tabletop"), None);
    }

    #[test]
    fn test_record_key_ignores_blank_ids() {
        let mut video = record("abc");
        assert_eq!(video.key(), Some("abc"));
        video.id = "   ".to_string();
        assert_eq!(video.key(), None);
    }

    #[test]
    fn test_recover_id_from_url() {
        let mut video = record("");
        video.url = watch_url("dQw4w9WgXcQ");
        assert!(video.recover_id());
        assert_eq!(video.id, "dQw4w9WgXcQ");
        assert!(!video.recover_id());
    }

    #[test]
    fn test_legacy_keys_are_accepted() {
        let json = r#"{
            "titulo": "Reseña",
            "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "fecha_subida": "20240131",
            "visualizaciones": 1500
        }"#;
        let video: VideoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(video.title, "Reseña");
        assert_eq!(video.upload_date.as_deref(), Some("20240131"));
        assert_eq!(video.view_count, Some(1500));
        assert!(video.id.is_empty());
        assert!(video.thumbnail.is_none());
    }

    #[test]
    fn test_null_strings_read_as_empty() {
        let json = r#"{
            "id": null,
            "title": null,
            "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "thumbnail": null,
            "channel_name": null,
            "channel_url": null,
            "view_count": null
        }"#;
        let mut video: VideoRecord = serde_json::from_str(json).unwrap();
        assert!(video.title.is_empty());
        assert!(video.channel_name.is_empty());
        assert!(video.channel_url.is_empty());
        assert!(video.view_count.is_none());
        assert!(video.recover_id());
        assert_eq!(video.id, "dQw4w9WgXcQ");
    }

    #[test]
    fn test_fetched_at_parsing_is_lenient() {
        let rfc: VideoRecord =
            serde_json::from_str(r#"{"id": "a", "fetched_at": "2024-05-01T10:00:00Z"}"#).unwrap();
        assert_eq!(
            rfc.fetched_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );

        let naive: VideoRecord =
            serde_json::from_str(r#"{"id": "a", "fetched_at": "2024-05-01T10:00:00.250000"}"#)
                .unwrap();
        assert!(naive.fetched_at.is_some());

        let garbage: VideoRecord =
            serde_json::from_str(r#"{"id": "a", "fetched_at": "yesterday"}"#).unwrap();
        assert!(garbage.fetched_at.is_none());

        let numeric: VideoRecord =
            serde_json::from_str(r#"{"id": "a", "fetched_at": 1714557600}"#).unwrap();
        assert!(numeric.fetched_at.is_none());
    }

    #[test]
    fn test_thumbnail_serializes_as_null() {
        let json = serde_json::to_value(record("a")).unwrap();
        assert!(json["thumbnail"].is_null());
        assert!(json.get("fetched_at").is_none());
        assert!(json.get("view_count").is_none());
    }

    #[test]
    fn test_catalog_with_categories() {
        let mut registry = ChannelRegistry::new();
        registry.insert("ingles", "A", "https://www.youtube.com/@a");
        registry.insert_category("espanol");

        let catalog = Catalog::with_categories(&registry);
        let names: Vec<_> = catalog.categories().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["ingles", "espanol"]);
        assert_eq!(catalog.channel_count(), 0);
        assert!(catalog.channel("ingles", "A").is_none());
    }

    #[test]
    fn test_catalog_stats() {
        let mut catalog = Catalog::new();
        let mut newest = record("b");
        newest.fetched_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let mut older = record("a");
        older.fetched_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        catalog.set_channel("ingles", "X", vec![newest.clone(), older]);
        catalog.set_channel("espanol", "Y", vec![record("c")]);

        let stats = catalog.stats();
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.channels, 2);
        assert_eq!(stats.videos, 3);
        assert_eq!(stats.newest_fetched_at, newest.fetched_at);
    }

    #[test]
    fn test_dedup_by_key_keeps_first() {
        let mut first = record("a");
        first.title = "first".to_string();
        let mut videos = vec![first, record("b"), record("a"), record(""), record("")];

        let removed = dedup_by_key(&mut videos);
        assert_eq!(removed, 1);
        assert_eq!(videos.len(), 4);
        assert_eq!(videos[0].title, "first");
    }
}
