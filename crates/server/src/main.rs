use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidcat_core::{
    build_site, config_warnings, create_fetcher, load_config, load_registry, run_pass,
    validate_config, ChannelFetcher, Config, JsonFileStore, SanitizedConfig,
    SiteConfig, SyncEngine, SyncOptions, SyncReport,
};
use vidcat_server::api::create_router;
use vidcat_server::cli::{Cli, Command};
use vidcat_server::state::{AppState, SyncRunError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,tower_http=debug".into()),
    );
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;
    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }

    match cli.cmd {
        Command::CheckConfig => check_config(&config),
        Command::Sync => sync_once(config).await,
        Command::Serve => serve(config).await,
        Command::BuildSite { out } => generate_site(&config, out),
    }
}

fn check_config(config: &Config) -> Result<()> {
    let sanitized = SanitizedConfig::from(config);
    println!("{}", serde_json::to_string_pretty(&sanitized)?);
    Ok(())
}

async fn create_validated_fetcher(config: &Config) -> Result<Arc<dyn ChannelFetcher>> {
    let fetcher: Arc<dyn ChannelFetcher> = Arc::from(create_fetcher(&config.fetcher));
    fetcher
        .validate()
        .await
        .with_context(|| format!("Fetch backend {} is not usable", fetcher.name()))?;
    info!("Using fetch backend: {}", fetcher.name());
    Ok(fetcher)
}

fn print_summary(report: &SyncReport) {
    println!(
        "pass {}: {} new videos, {} channels updated, {} failed, {} malformed entries skipped ({:.1}s)",
        report.pass_id,
        report.new_videos(),
        report.updated_count(),
        report.failed_count(),
        report.skipped_malformed(),
        report.duration().as_secs_f64()
    );
    for failed in report.failed() {
        println!("  failed: {}/{}", failed.category, failed.channel);
    }
}

async fn sync_once(config: Config) -> Result<()> {
    let registry = load_registry(&config.paths.registry).with_context(|| {
        format!("Failed to load channel registry from {:?}", config.paths.registry)
    })?;
    let fetcher = create_validated_fetcher(&config).await?;
    let engine = SyncEngine::new(fetcher, SyncOptions::from(&config.sync));
    let store = JsonFileStore::new(&config.paths.catalog);

    match run_pass(&engine, &store, &registry).await {
        Ok(outcome) => {
            print_summary(&outcome.report);
            Ok(())
        }
        Err(e) => {
            print_summary(&e.outcome().report);
            Err(e).context("Sync pass could not be saved")
        }
    }
}

fn generate_site(config: &Config, out: Option<std::path::PathBuf>) -> Result<()> {
    let registry = load_registry(&config.paths.registry).with_context(|| {
        format!("Failed to load channel registry from {:?}", config.paths.registry)
    })?;
    let site = SiteConfig {
        out_dir: out.unwrap_or_else(|| config.paths.site_dir.clone()),
        static_assets: config.paths.static_assets.clone(),
    };

    let summary = build_site(&site, &registry, &config.paths.catalog)
        .context("Failed to generate static site")?;
    println!(
        "site written to {} ({} channels, {} videos, {} assets)",
        summary.out_dir.display(),
        summary.channels,
        summary.videos,
        summary.assets_copied
    );
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let fetcher: Arc<dyn ChannelFetcher> = match create_validated_fetcher(&config).await {
        Ok(fetcher) => fetcher,
        Err(e) => {
            // pages still render; passes fail per channel
            warn!("{:#}", e);
            Arc::from(create_fetcher(&config.fetcher))
        }
    };
    let store = Arc::new(JsonFileStore::new(&config.paths.catalog));
    let state = Arc::new(AppState::new(config.clone(), store, fetcher));

    let scheduler = config
        .sync
        .interval_secs
        .map(|secs| tokio::spawn(sync_loop(Arc::clone(&state), Duration::from_secs(secs))));

    let app = create_router(Arc::clone(&state));

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = scheduler {
        info!("Stopping sync scheduler...");
        handle.abort();
    }
    info!("Server shut down");

    Ok(())
}

/// Run a pass every `period`, starting immediately.
async fn sync_loop(state: Arc<AppState>, period: Duration) {
    info!("Sync scheduler running every {:?}", period);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match state.run_sync().await {
            Ok(outcome) => info!(
                new_videos = outcome.report.new_videos(),
                failed = outcome.report.failed_count(),
                "Scheduled sync pass saved"
            ),
            Err(SyncRunError::Busy) => info!("Skipping scheduled pass, one is already running"),
            Err(e) => error!(error = %e, "Scheduled sync pass failed"),
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
