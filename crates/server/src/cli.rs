use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vidcat")]
#[command(about = "Rolling catalog of recent videos from curated channels")]
#[command(version)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, env = "VIDCAT_CONFIG", default_value = "vidcat.toml", global = true)]
    pub config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one sync pass and save the catalog.
    Sync,
    /// Serve the live page and API.
    Serve,
    /// Generate the static site.
    BuildSite {
        /// Output directory (defaults to paths.site_dir).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Load and validate the configuration, then print it.
    CheckConfig,
}
