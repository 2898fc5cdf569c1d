//! Fetch adapter: lists the most recent uploads of a channel.
//!
//! The adapter is the only part of the system that talks to the video
//! platform. The sync engine only sees [`FetchedEntry`] values through the
//! [`ChannelFetcher`] trait, so tests drive it with
//! [`MockFetcher`](crate::testing::MockFetcher).

mod error;
mod types;
mod yt_dlp;

pub use error::{FetchError, MalformedRecordError};
pub use types::{ChannelContext, FetchedEntry};
pub use yt_dlp::{uploads_url, YtDlpFetcher};

use async_trait::async_trait;

use crate::config::{FetcherBackend, FetcherConfig};

/// Lists recent uploads for a channel reference.
///
/// Implementations return at most `window` entries, newest first. Entries
/// are passed through even when incomplete; validation happens when they
/// are turned into catalog records.
#[async_trait]
pub trait ChannelFetcher: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch up to `window` of the channel's most recent uploads.
    async fn fetch_recent(
        &self,
        channel_ref: &str,
        window: usize,
    ) -> Result<Vec<FetchedEntry>, FetchError>;

    /// Check that the backend is usable (binary present, etc.).
    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}

/// Build the configured fetch backend.
pub fn create_fetcher(config: &FetcherConfig) -> Box<dyn ChannelFetcher> {
    match config.backend {
        FetcherBackend::YtDlp => Box::new(YtDlpFetcher::new(config.yt_dlp.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_fetcher() {
        let fetcher = create_fetcher(&FetcherConfig::default());
        assert_eq!(fetcher.name(), "yt_dlp");
    }
}
