//! Static site generation.
//!
//! Writes a self-contained snapshot of the catalog into a directory:
//! `index.html`, `data.html`, a byte copy of the catalog document as
//! `videos.json`, and optional static assets under `static/`.

use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{parse_catalog, CatalogError};
use crate::render::{render_data_page, render_index};
use crate::registry::ChannelRegistry;

/// Where the site is built from and written to.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Output directory. Removed and recreated on every build.
    pub out_dir: PathBuf,
    /// Directory whose files are copied into `<out_dir>/static`.
    pub static_assets: Option<PathBuf>,
}

/// What a build produced.
#[derive(Debug, Clone, Serialize)]
pub struct SiteSummary {
    pub out_dir: PathBuf,
    pub pages: Vec<PathBuf>,
    pub assets_copied: usize,
    pub channels: usize,
    pub videos: usize,
}

/// Errors for site generation.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Catalog document not found: {0}")]
    CatalogNotFound(PathBuf),

    #[error("Catalog document is unusable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), SiteError> {
    fs::write(path, contents).map_err(|source| SiteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the static site.
///
/// Unlike a sync pass, the catalog document must exist and parse: a site
/// built from an empty default would silently publish nothing.
pub fn build_site(
    config: &SiteConfig,
    registry: &ChannelRegistry,
    catalog_path: &Path,
) -> Result<SiteSummary, SiteError> {
    if !catalog_path.is_file() {
        return Err(SiteError::CatalogNotFound(catalog_path.to_path_buf()));
    }
    let raw = fs::read(catalog_path)?;
    let parsed = parse_catalog(&raw)?;
    let catalog = parsed.catalog;

    let out = &config.out_dir;
    if out.exists() {
        fs::remove_dir_all(out)?;
        info!(dir = %out.display(), "Cleaned output directory");
    }
    fs::create_dir_all(out.join("static"))?;

    let index = out.join("index.html");
    write_file(&index, render_index(&catalog, registry, Utc::now()).as_bytes())?;

    let data = out.join("data.html");
    write_file(&data, render_data_page(&catalog)?.as_bytes())?;

    let videos = out.join("videos.json");
    write_file(&videos, &raw)?;

    let assets_copied = match &config.static_assets {
        Some(dir) => copy_assets(dir, &out.join("static"))?,
        None => 0,
    };

    let stats = catalog.stats();
    info!(
        dir = %out.display(),
        channels = stats.channels,
        videos = stats.videos,
        assets_copied,
        "Static site generated"
    );

    Ok(SiteSummary {
        out_dir: out.clone(),
        pages: vec![index, data, videos],
        assets_copied,
        channels: stats.channels,
        videos: stats.videos,
    })
}

/// Copy regular files (not subdirectories) from `src` into `dest`.
fn copy_assets(src: &Path, dest: &Path) -> Result<usize, SiteError> {
    if !src.is_dir() {
        warn!(dir = %src.display(), "Static assets directory not found, skipping");
        return Ok(0);
    }

    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let target = dest.join(entry.file_name());
        fs::copy(entry.path(), &target).map_err(|source| SiteError::Write {
            path: target.clone(),
            source,
        })?;
        copied += 1;
    }
    Ok(copied)
}
