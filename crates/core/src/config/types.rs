use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Locations of the documents the system reads and writes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Persisted catalog document.
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,
    /// Channel registry document (read-only input).
    #[serde(default = "default_registry_path")]
    pub registry: PathBuf,
    /// Output directory of the static site generator.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
    /// Optional directory whose files are copied into `<site_dir>/static`.
    #[serde(default)]
    pub static_assets: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog_path(),
            registry: default_registry_path(),
            site_dir: default_site_dir(),
            static_assets: None,
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("videos_juegos_mesa.json")
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("channels_config.json")
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// Synchronization pass tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// How many of a channel's most recent videos are inspected per pass.
    #[serde(default = "default_check_window")]
    pub check_window: usize,
    /// Maximum number of videos kept per channel.
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,
    /// Pause between consecutive channel fetches, in milliseconds.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
    /// When set, `serve` runs a pass on this period.
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

impl SyncConfig {
    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            check_window: default_check_window(),
            retention_cap: default_retention_cap(),
            pace_ms: default_pace_ms(),
            interval_secs: None,
        }
    }
}

fn default_check_window() -> usize {
    10
}

fn default_retention_cap() -> usize {
    200
}

fn default_pace_ms() -> u64 {
    2000
}

/// Fetch adapter configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub backend: FetcherBackend,
    #[serde(default)]
    pub yt_dlp: YtDlpConfig,
}

/// Available fetch backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetcherBackend {
    #[default]
    YtDlp,
}

/// yt-dlp backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YtDlpConfig {
    /// Path to the yt-dlp executable.
    #[serde(default = "default_yt_dlp_binary")]
    pub binary: PathBuf,
    /// Timeout for a single channel listing in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Additional arguments passed before the channel reference.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            binary: default_yt_dlp_binary(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

fn default_yt_dlp_binary() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout() -> u64 {
    60
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Config view for API responses (extra fetcher arguments hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub paths: PathsConfig,
    pub sync: SyncConfig,
    pub fetcher: SanitizedFetcherConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedFetcherConfig {
    pub backend: String,
    pub binary: PathBuf,
    pub timeout_secs: u64,
    pub extra_args_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            paths: config.paths.clone(),
            sync: config.sync.clone(),
            fetcher: SanitizedFetcherConfig {
                backend: match config.fetcher.backend {
                    FetcherBackend::YtDlp => "yt_dlp".to_string(),
                },
                binary: config.fetcher.yt_dlp.binary.clone(),
                timeout_secs: config.fetcher.yt_dlp.timeout_secs,
                extra_args_configured: !config.fetcher.yt_dlp.extra_args.is_empty(),
            },
            server: config.server.clone(),
        }
    }
}
