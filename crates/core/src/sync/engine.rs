//! The sync engine: reconcile a catalog against fresh channel listings.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::types::{
    ChannelOutcome, ChannelReport, MergeOutcome, PassError, SyncOptions, SyncOutcome, SyncReport,
};
use crate::catalog::{Catalog, CatalogStore, VideoRecord};
use crate::fetcher::{ChannelContext, ChannelFetcher};
use crate::metrics;
use crate::registry::{ChannelRegistry, RegistryEntry};

/// Merge freshly fetched records into a channel's existing list.
///
/// `fresh` must be newest first. Records whose id is already in `existing`
/// are not new: the existing instance stays where it is. New records are
/// prepended in fetch order, then the list is cut to `cap` from the tail.
/// Order is never re-sorted. Fresh records without an id are ignored, and
/// repeated ids within `fresh` count once.
pub fn merge_channel(existing: &[VideoRecord], fresh: Vec<VideoRecord>, cap: usize) -> MergeOutcome {
    let mut seen: HashSet<String> = existing
        .iter()
        .filter_map(VideoRecord::key)
        .map(str::to_string)
        .collect();

    let mut videos: Vec<VideoRecord> = fresh
        .into_iter()
        .filter(|record| match record.key() {
            Some(key) => seen.insert(key.to_string()),
            None => false,
        })
        .collect();
    let new_count = videos.len();

    videos.extend(existing.iter().cloned());
    let truncated = videos.len().saturating_sub(cap);
    videos.truncate(cap);

    MergeOutcome {
        videos,
        new_count,
        truncated,
    }
}

/// Runs sync passes over a channel registry.
///
/// Channels are processed one at a time, with `pace` between consecutive
/// fetches. A failing channel never aborts the pass.
pub struct SyncEngine {
    fetcher: Arc<dyn ChannelFetcher>,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(fetcher: Arc<dyn ChannelFetcher>, options: SyncOptions) -> Self {
        Self { fetcher, options }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn fetcher(&self) -> &Arc<dyn ChannelFetcher> {
        &self.fetcher
    }

    /// Build the next catalog from `previous` and live listings.
    ///
    /// The result holds exactly the registry's categories and channels.
    /// `previous` is not modified.
    pub async fn synchronize(&self, registry: &ChannelRegistry, previous: &Catalog) -> SyncOutcome {
        let pass_id = Uuid::new_v4();
        let span = info_span!("sync_pass", %pass_id);
        self.run_channels(pass_id, registry, previous)
            .instrument(span)
            .await
    }

    async fn run_channels(
        &self,
        pass_id: Uuid,
        registry: &ChannelRegistry,
        previous: &Catalog,
    ) -> SyncOutcome {
        let started_at = Utc::now();
        info!(
            channels = registry.channel_count(),
            categories = registry.category_count(),
            window = self.options.check_window,
            cap = self.options.retention_cap,
            fetcher = self.fetcher.name(),
            "Starting sync pass"
        );

        let mut catalog = Catalog::with_categories(registry);
        let mut channels = Vec::with_capacity(registry.channel_count());

        for (index, entry) in registry.entries().enumerate() {
            if index > 0 && !self.options.pace.is_zero() {
                tokio::time::sleep(self.options.pace).await;
            }

            let existing = previous
                .channel(entry.category, entry.display_name)
                .unwrap_or_default();
            let (videos, report) = self.sync_channel(&entry, existing).await;
            catalog.set_channel(entry.category, entry.display_name, videos);
            channels.push(report);
        }

        let pruned_channels = count_unregistered(previous, registry);
        if pruned_channels > 0 {
            warn!(
                pruned_channels,
                "Dropped channels that are no longer in the registry"
            );
        }

        let report = SyncReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            channels,
            pruned_channels,
        };

        info!(
            new_videos = report.new_videos(),
            updated = report.updated_count(),
            failed = report.failed_count(),
            skipped_malformed = report.skipped_malformed(),
            "Sync pass finished"
        );

        SyncOutcome { catalog, report }
    }

    async fn sync_channel(
        &self,
        entry: &RegistryEntry<'_>,
        existing: &[VideoRecord],
    ) -> (Vec<VideoRecord>, ChannelReport) {
        let cap = self.options.retention_cap;
        let backend = self.fetcher.name();
        let timer = Instant::now();
        let fetched = self
            .fetcher
            .fetch_recent(entry.reference, self.options.check_window)
            .await;
        metrics::FETCH_DURATION
            .with_label_values(&[backend])
            .observe(timer.elapsed().as_secs_f64());

        let mut skipped_malformed = 0;
        let (videos, outcome, truncated) = match fetched {
            Ok(entries) => {
                let context = ChannelContext {
                    display_name: entry.display_name,
                    reference: entry.reference,
                };
                let fetched_at = Utc::now();
                let records: Vec<VideoRecord> = entries
                    .into_iter()
                    .take(self.options.check_window)
                    .filter_map(|raw| match raw.into_record(context, fetched_at) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!(channel = %entry.display_name, error = %e, "Skipping malformed video entry");
                            skipped_malformed += 1;
                            None
                        }
                    })
                    .collect();

                let merged = merge_channel(existing, records, cap);
                let outcome = if merged.new_count > 0 {
                    info!(
                        category = %entry.category,
                        channel = %entry.display_name,
                        new = merged.new_count,
                        total = merged.videos.len(),
                        "Channel updated"
                    );
                    ChannelOutcome::Updated {
                        new: merged.new_count,
                    }
                } else {
                    debug!(channel = %entry.display_name, "No new videos");
                    ChannelOutcome::Unchanged
                };
                (merged.videos, outcome, merged.truncated)
            }
            Err(e) => {
                warn!(
                    category = %entry.category,
                    channel = %entry.display_name,
                    reference = %entry.reference,
                    error = %e,
                    "Channel fetch failed, keeping previous videos"
                );
                metrics::FETCH_ERRORS
                    .with_label_values(&[backend, e.kind()])
                    .inc();

                let mut kept = existing.to_vec();
                let truncated = kept.len().saturating_sub(cap);
                kept.truncate(cap);
                let outcome = ChannelOutcome::Failed {
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                };
                (kept, outcome, truncated)
            }
        };

        metrics::CHANNEL_OUTCOMES
            .with_label_values(&[entry.category, outcome.as_str()])
            .inc();
        metrics::VIDEOS_ADDED
            .with_label_values(&[entry.category])
            .inc_by(outcome.new_videos() as u64);
        metrics::VIDEOS_TRUNCATED.inc_by(truncated as u64);
        metrics::MALFORMED_ENTRIES.inc_by(skipped_malformed as u64);

        let report = ChannelReport {
            category: entry.category.to_string(),
            channel: entry.display_name.to_string(),
            reference: entry.reference.to_string(),
            outcome,
            skipped_malformed,
            truncated,
            total: videos.len(),
        };
        (videos, report)
    }
}

fn count_unregistered(previous: &Catalog, registry: &ChannelRegistry) -> usize {
    previous
        .categories()
        .flat_map(|(category, channels)| channels.keys().map(move |name| (category, name)))
        .filter(|(category, name)| {
            registry
                .channels(category)
                .map_or(true, |registered| !registered.contains_key(name.as_str()))
        })
        .count()
}

/// Load, synchronize and save in one go.
///
/// Load never fails. A save failure is returned with the computed outcome
/// so nothing from the pass is lost.
pub async fn run_pass<S>(
    engine: &SyncEngine,
    store: &S,
    registry: &ChannelRegistry,
) -> Result<SyncOutcome, PassError>
where
    S: CatalogStore + ?Sized,
{
    let timer = Instant::now();
    let previous = store.load(registry);
    let outcome = engine.synchronize(registry, &previous).await;
    metrics::SYNC_DURATION
        .with_label_values(&[])
        .observe(timer.elapsed().as_secs_f64());

    match store.save(&outcome.catalog) {
        Ok(()) => {
            metrics::SYNC_PASSES.with_label_values(&["saved"]).inc();
            info!(
                pass_id = %outcome.report.pass_id,
                location = %store.location(),
                videos = outcome.catalog.video_count(),
                "Catalog saved"
            );
            Ok(outcome)
        }
        Err(source) => {
            metrics::SYNC_PASSES.with_label_values(&["save_failed"]).inc();
            error!(
                pass_id = %outcome.report.pass_id,
                location = %store.location(),
                error = %source,
                "Failed to save catalog"
            );
            Err(PassError::Save {
                outcome: Box::new(outcome),
                source,
            })
        }
    }
}
