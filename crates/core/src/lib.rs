pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod site;
pub mod sync;
pub mod testing;

pub use catalog::{
    Catalog, CatalogError, CatalogStats, CatalogStore, JsonFileStore, MemoryStore, VideoRecord,
};
pub use config::{
    config_warnings, load_config, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use fetcher::{
    create_fetcher, ChannelFetcher, FetchError, FetchedEntry, MalformedRecordError, YtDlpFetcher,
};
pub use registry::{load_registry, ChannelRegistry, RegistryError};
pub use site::{build_site, SiteConfig, SiteError, SiteSummary};
pub use sync::{
    merge_channel, run_pass, ChannelOutcome, PassError, SyncEngine, SyncOptions, SyncOutcome,
    SyncReport,
};
