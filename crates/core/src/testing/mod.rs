//! Testing utilities: a scripted fetch backend and record fixtures.
//!
//! ```rust,ignore
//! use vidcat_core::testing::{fixtures, MockFetcher};
//! use vidcat_core::{MemoryStore, SyncEngine, SyncOptions};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.set_listing("@npi", vec![fixtures::fetched_entry("v1")]).await;
//! let engine = SyncEngine::new(Arc::new(fetcher), SyncOptions::default().without_pacing());
//! ```

mod mock_fetcher;

pub use mock_fetcher::{MockFetcher, RecordedFetch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::catalog::{watch_url, VideoRecord};
    use crate::fetcher::FetchedEntry;
    use crate::registry::ChannelRegistry;

    /// A fetched entry with every field a flat listing usually carries.
    pub fn fetched_entry(id: &str) -> FetchedEntry {
        FetchedEntry {
            id: Some(id.to_string()),
            title: Some(format!("Video {id}")),
            thumbnail: Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
            channel_name: None,
            duration: Some(600.0),
            upload_date: None,
            view_count: Some(1_000),
        }
    }

    /// Entries for the given ids, in the order given (newest first).
    pub fn fetched_entries(ids: &[&str]) -> Vec<FetchedEntry> {
        ids.iter().map(|id| fetched_entry(id)).collect()
    }

    /// A stored record as an earlier pass would have written it.
    pub fn video_record(id: &str, channel: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Video {id}"),
            url: watch_url(id),
            thumbnail: Some(format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg")),
            channel_name: channel.to_string(),
            channel_url: format!("https://www.youtube.com/@{}", channel.replace(' ', "")),
            fetched_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single(),
            duration: Some(600.0),
            upload_date: None,
            view_count: Some(1_000),
        }
    }

    /// Records for the given ids, in the order given.
    pub fn video_records(ids: &[&str], channel: &str) -> Vec<VideoRecord> {
        ids.iter().map(|id| video_record(id, channel)).collect()
    }

    /// Two categories with two channels and one channel respectively.
    pub fn registry() -> ChannelRegistry {
        let mut registry = ChannelRegistry::new();
        registry.insert("ingles", "No Pun Included", "https://www.youtube.com/@NoPunIncluded");
        registry.insert("ingles", "Shut Up & Sit Down", "https://www.youtube.com/@shutupandsitdown");
        registry.insert("espanol", "Mishi Geek", "https://www.youtube.com/@MishiGeek");
        registry
    }

    /// A registry with one channel.
    pub fn single_channel_registry(category: &str, name: &str, reference: &str) -> ChannelRegistry {
        let mut registry = ChannelRegistry::new();
        registry.insert(category, name, reference);
        registry
    }
}
