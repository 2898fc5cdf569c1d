//! Raw entries produced by a fetch backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::MalformedRecordError;
use crate::catalog::{watch_url, VideoRecord};

/// A video as listed by the platform, before validation.
///
/// Every field is optional because listings vary by backend and version;
/// `into_record` decides what is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    /// Channel name as reported by the platform.
    pub channel_name: Option<String>,
    pub duration: Option<f64>,
    /// Upload date as `YYYYMMDD`.
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
}

/// The registered channel an entry was fetched for.
#[derive(Debug, Clone, Copy)]
pub struct ChannelContext<'a> {
    /// Registry display name, used when the platform reports no name.
    pub display_name: &'a str,
    /// Channel reference the listing was requested with.
    pub reference: &'a str,
}

impl FetchedEntry {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Validate the entry and turn it into an immutable catalog record.
    pub fn into_record(
        self,
        channel: ChannelContext<'_>,
        fetched_at: DateTime<Utc>,
    ) -> Result<VideoRecord, MalformedRecordError> {
        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(MalformedRecordError::MissingId { title: self.title }),
        };

        Ok(VideoRecord {
            url: watch_url(&id),
            id,
            title: self.title.unwrap_or_default(),
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
            channel_name: self
                .channel_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| channel.display_name.to_string()),
            channel_url: channel.reference.to_string(),
            fetched_at: Some(fetched_at),
            duration: self.duration,
            upload_date: self.upload_date,
            view_count: self.view_count,
        })
    }
}
