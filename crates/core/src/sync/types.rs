//! Types for sync passes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogError, ChannelVideos};
use crate::config::SyncConfig;

/// Tuning for a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Number of most recent upstream videos inspected per channel.
    pub check_window: usize,
    /// Maximum videos kept per channel.
    pub retention_cap: usize,
    /// Pause between consecutive channel fetches.
    pub pace: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            check_window: config.check_window,
            retention_cap: config.retention_cap,
            pace: config.pace(),
        }
    }
}

impl SyncOptions {
    pub fn with_check_window(mut self, check_window: usize) -> Self {
        self.check_window = check_window;
        self
    }

    pub fn with_retention_cap(mut self, retention_cap: usize) -> Self {
        self.retention_cap = retention_cap;
        self
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub fn without_pacing(self) -> Self {
        self.with_pace(Duration::ZERO)
    }
}

/// Result of merging one channel's fetch into its existing list.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The merged list, newest first, at most `retention_cap` long.
    pub videos: ChannelVideos,
    /// Fetched records that were not known before.
    pub new_count: usize,
    /// Records dropped from the tail by the cap.
    pub truncated: usize,
}

/// What happened to one channel during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// The fetch found videos that were not in the catalog.
    Updated { new: usize },
    /// The fetch succeeded but everything was already known.
    Unchanged,
    /// The fetch failed; the previous list was kept.
    Failed { kind: String, error: String },
}

impl ChannelOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "updated",
            Self::Unchanged => "unchanged",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn new_videos(&self) -> usize {
        match self {
            Self::Updated { new } => *new,
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-channel line of a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub category: String,
    pub channel: String,
    pub reference: String,
    #[serde(flatten)]
    pub outcome: ChannelOutcome,
    /// Fetched entries skipped because they had no id.
    pub skipped_malformed: usize,
    /// Records dropped by the retention cap.
    pub truncated: usize,
    /// Length of the channel's list after the pass.
    pub total: usize,
}

/// Summary of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub channels: Vec<ChannelReport>,
    /// Channels in the previous catalog that are no longer registered.
    pub pruned_channels: usize,
}

impl SyncReport {
    pub fn new_videos(&self) -> usize {
        self.channels.iter().map(|c| c.outcome.new_videos()).sum()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ChannelReport> {
        self.channels.iter().filter(|c| c.outcome.is_failure())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    pub fn updated_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| matches!(c.outcome, ChannelOutcome::Updated { .. }))
            .count()
    }

    pub fn skipped_malformed(&self) -> usize {
        self.channels.iter().map(|c| c.skipped_malformed).sum()
    }

    /// The report line for a channel, if it was part of the pass.
    pub fn channel(&self, category: &str, channel: &str) -> Option<&ChannelReport> {
        self.channels
            .iter()
            .find(|c| c.category == category && c.channel == channel)
    }

    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// The catalog produced by a pass, together with its report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub catalog: Catalog,
    pub report: SyncReport,
}

/// Failure of a whole pass.
///
/// Only saving can fail a pass. The computed outcome is carried along so
/// callers can still report it.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("Sync pass completed but the catalog was not saved: {source}")]
    Save {
        outcome: Box<SyncOutcome>,
        #[source]
        source: CatalogError,
    },
}

impl PassError {
    pub fn outcome(&self) -> &SyncOutcome {
        match self {
            Self::Save { outcome, .. } => outcome,
        }
    }

    pub fn into_outcome(self) -> SyncOutcome {
        match self {
            Self::Save { outcome, .. } => *outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let config = SyncConfig {
            check_window: 5,
            retention_cap: 50,
            pace_ms: 250,
            interval_secs: None,
        };
        let options = SyncOptions::from(&config);
        assert_eq!(options.check_window, 5);
        assert_eq!(options.retention_cap, 50);
        assert_eq!(options.pace, Duration::from_millis(250));
        assert_eq!(options.without_pacing().pace, Duration::ZERO);
    }

    #[test]
    fn test_channel_outcome_serializes_flat() {
        let report = ChannelReport {
            category: "ingles".into(),
            channel: "No Pun Included".into(),
            reference: "https://www.youtube.com/@NoPunIncluded".into(),
            outcome: ChannelOutcome::Updated { new: 2 },
            skipped_malformed: 0,
            truncated: 0,
            total: 12,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "updated");
        assert_eq!(json["new"], 2);
        assert_eq!(json["total"], 12);

        let failed = ChannelOutcome::Failed {
            kind: "timeout".into(),
            error: "Channel listing timed out after 60 seconds".into(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "timeout");
    }

    #[test]
    fn test_report_totals() {
        let line = |channel: &str, outcome| ChannelReport {
            category: "ingles".into(),
            channel: channel.into(),
            reference: String::new(),
            outcome,
            skipped_malformed: 1,
            truncated: 0,
            total: 0,
        };
        let now = Utc::now();
        let report = SyncReport {
            pass_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            channels: vec![
                line("a", ChannelOutcome::Updated { new: 3 }),
                line("b", ChannelOutcome::Unchanged),
                line(
                    "c",
                    ChannelOutcome::Failed {
                        kind: "parse".into(),
                        error: "bad".into(),
                    },
                ),
            ],
            pruned_channels: 0,
        };

        assert_eq!(report.new_videos(), 3);
        assert_eq!(report.updated_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.skipped_malformed(), 3);
        assert_eq!(report.channel("ingles", "b").unwrap().outcome.as_str(), "unchanged");
        assert!(report.channel("espanol", "b").is_none());
    }
}
