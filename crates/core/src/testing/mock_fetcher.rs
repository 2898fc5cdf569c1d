//! Mock fetch backend for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetcher::{ChannelFetcher, FetchError, FetchedEntry};

/// A recorded listing request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub channel_ref: String,
    pub window: usize,
}

/// Scripted response for one listing request.
#[derive(Debug, Clone)]
enum Scripted {
    Entries(Vec<FetchedEntry>),
    Failure(String),
}

/// Mock implementation of the [`ChannelFetcher`] trait.
///
/// Each channel reference has a standing listing plus an optional queue of
/// one-shot responses that are consumed first. Unknown references fail as
/// if the backend could not list them.
///
/// # Example
///
/// ```rust,ignore
/// use vidcat_core::testing::{fixtures, MockFetcher};
///
/// let fetcher = MockFetcher::new();
/// fetcher.set_listing("@npi", vec![fixtures::fetched_entry("v2"), fixtures::fetched_entry("v1")]).await;
/// fetcher.fail_next("@npi", "HTTP Error 429").await;
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    listings: Arc<RwLock<HashMap<String, Vec<FetchedEntry>>>>,
    queued: Arc<RwLock<HashMap<String, VecDeque<Scripted>>>>,
    failing: Arc<RwLock<HashMap<String, String>>>,
    calls: Arc<RwLock<Vec<RecordedFetch>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the standing listing for a channel, newest first.
    pub async fn set_listing(&self, channel_ref: &str, entries: Vec<FetchedEntry>) {
        self.listings
            .write()
            .await
            .insert(channel_ref.to_string(), entries);
    }

    /// Make every request for a channel fail until cleared.
    pub async fn set_failing(&self, channel_ref: &str, reason: &str) {
        self.failing
            .write()
            .await
            .insert(channel_ref.to_string(), reason.to_string());
    }

    pub async fn clear_failing(&self, channel_ref: &str) {
        self.failing.write().await.remove(channel_ref);
    }

    /// Queue a one-shot listing, returned before the standing one.
    pub async fn push_listing(&self, channel_ref: &str, entries: Vec<FetchedEntry>) {
        self.queue(channel_ref, Scripted::Entries(entries)).await;
    }

    /// Queue a one-shot failure.
    pub async fn fail_next(&self, channel_ref: &str, reason: &str) {
        self.queue(channel_ref, Scripted::Failure(reason.to_string()))
            .await;
    }

    async fn queue(&self, channel_ref: &str, response: Scripted) {
        self.queued
            .write()
            .await
            .entry(channel_ref.to_string())
            .or_default()
            .push_back(response);
    }

    /// All requests made so far, in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedFetch> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl ChannelFetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_recent(
        &self,
        channel_ref: &str,
        window: usize,
    ) -> Result<Vec<FetchedEntry>, FetchError> {
        self.calls.write().await.push(RecordedFetch {
            channel_ref: channel_ref.to_string(),
            window,
        });

        let queued = self
            .queued
            .write()
            .await
            .get_mut(channel_ref)
            .and_then(VecDeque::pop_front);

        let scripted = match queued {
            Some(scripted) => scripted,
            None => {
                if let Some(reason) = self.failing.read().await.get(channel_ref) {
                    Scripted::Failure(reason.clone())
                } else {
                    match self.listings.read().await.get(channel_ref) {
                        Some(entries) => Scripted::Entries(entries.clone()),
                        None => Scripted::Failure(format!("no listing for {channel_ref}")),
                    }
                }
            }
        };

        match scripted {
            Scripted::Entries(mut entries) => {
                entries.truncate(window);
                Ok(entries)
            }
            Scripted::Failure(reason) => Err(FetchError::command_failed(reason, None)),
        }
    }
}
