//! yt-dlp based fetch backend.

use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::error::FetchError;
use super::types::FetchedEntry;
use super::ChannelFetcher;
use crate::config::YtDlpConfig;

/// Lists a channel's most recent uploads with `yt-dlp --flat-playlist`.
///
/// Flat extraction only reads the channel's listing page, so a pass costs one
/// request per channel regardless of the check window.
pub struct YtDlpFetcher {
    config: YtDlpConfig,
}

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    entries: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    #[serde(default, rename = "_type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    thumbnails: Option<Vec<Thumbnail>>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    view_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl YtDlpFetcher {
    pub fn new(config: YtDlpConfig) -> Self {
        Self { config }
    }

    /// Builds the yt-dlp argument list for one channel listing.
    fn build_args(&self, target: &str, window: usize) -> Vec<String> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
            "--playlist-end".to_string(),
            window.to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(target.to_string());
        args
    }

    /// Parses the single JSON document printed by yt-dlp.
    ///
    /// Nested playlists (channel tabs) and entries that are not objects are
    /// skipped. The result is capped at `window` entries, newest first.
    fn parse_listing(stdout: &str, window: usize) -> Result<(Vec<FetchedEntry>, usize), FetchError> {
        let listing: Listing =
            serde_json::from_str(stdout).map_err(|e| FetchError::Parse(e.to_string()))?;

        let fallback_channel = listing.channel.or(listing.uploader);
        let mut skipped = 0;
        let mut entries = Vec::new();

        for value in listing.entries.unwrap_or_default() {
            if entries.len() >= window {
                break;
            }

            let entry: ListingEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable listing entry");
                    skipped += 1;
                    continue;
                }
            };

            if entry.kind.as_deref() == Some("playlist") {
                skipped += 1;
                continue;
            }

            let thumbnail = entry.thumbnail.or_else(|| {
                entry
                    .thumbnails
                    .and_then(|thumbs| thumbs.into_iter().last())
                    .map(|t| t.url)
            });

            entries.push(FetchedEntry {
                id: entry.id,
                title: entry.title,
                thumbnail,
                channel_name: entry
                    .channel
                    .or(entry.uploader)
                    .or_else(|| fallback_channel.clone()),
                duration: entry.duration,
                upload_date: entry.upload_date,
                view_count: entry.view_count,
            });
        }

        Ok((entries, skipped))
    }
}

/// Point channel home URLs at their uploads tab.
///
/// `https://www.youtube.com/@name` lists the channel tabs rather than videos
/// when extracted flat; `.../@name/videos` lists the uploads newest first.
pub fn uploads_url(reference: &str) -> String {
    let trimmed = reference.trim().trim_end_matches('/');
    let Some((_, path)) = trimmed.split_once("youtube.com/") else {
        return trimmed.to_string();
    };

    let segments: Vec<&str> = path.split('/').collect();
    let is_channel_home = match segments.as_slice() {
        [handle] => handle.starts_with('@'),
        [kind, _] => matches!(*kind, "channel" | "c" | "user"),
        _ => false,
    };

    if is_channel_home {
        format!("{trimmed}/videos")
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl ChannelFetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt_dlp"
    }

    async fn fetch_recent(
        &self,
        channel_ref: &str,
        window: usize,
    ) -> Result<Vec<FetchedEntry>, FetchError> {
        let target = uploads_url(channel_ref);
        let args = self.build_args(&target, window);
        debug!(binary = %self.config.binary.display(), ?args, "Running yt-dlp");

        let child = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::BinaryNotFound {
                        path: self.config.binary.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        let output = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| FetchError::Timeout {
            timeout_secs: self.config.timeout_secs,
        })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(FetchError::command_failed(
                format!("yt-dlp exited with {}", output.status),
                (!stderr.is_empty()).then_some(stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (entries, skipped) = Self::parse_listing(&stdout, window)?;
        if skipped > 0 {
            warn!(channel = %channel_ref, skipped, "Skipped malformed listing entries");
        }

        if entries.is_empty() {
            return Err(FetchError::Empty {
                channel: channel_ref.to_string(),
            });
        }

        Ok(entries)
    }

    async fn validate(&self) -> Result<(), FetchError> {
        let output = Command::new(&self.config.binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::BinaryNotFound {
                        path: self.config.binary.clone(),
                    }
                } else {
                    FetchError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(FetchError::command_failed(
                "yt-dlp --version failed",
                Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            ));
        }
        Ok(())
    }
}
