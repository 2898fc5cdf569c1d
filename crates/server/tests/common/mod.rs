//! Common test utilities for API testing with mocks.
//!
//! The fixture builds the real router over a temporary directory holding
//! the registry and catalog documents, with a `MockFetcher` in place of
//! yt-dlp.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use vidcat_core::{
    catalog::{CatalogStore, JsonFileStore, MemoryStore},
    config::{Config, PathsConfig},
    testing::MockFetcher,
    Catalog,
};
use vidcat_server::state::AppState;

/// Re-export fixtures for test convenience
pub use vidcat_core::testing::fixtures;

pub const REGISTRY: &str = r#"{
    "ingles": {
        "No Pun Included": "https://www.youtube.com/@NoPunIncluded",
        "Shut Up & Sit Down": "https://www.youtube.com/@shutupandsitdown"
    },
    "espanol": {
        "Mishi Geek": "https://www.youtube.com/@MishiGeek"
    }
}"#;

pub const NPI: &str = "https://www.youtube.com/@NoPunIncluded";
pub const SUSD: &str = "https://www.youtube.com/@shutupandsitdown";
pub const MISHI: &str = "https://www.youtube.com/@MishiGeek";

/// Which catalog store backs the fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreKind {
    #[default]
    File,
    /// In-memory store whose saves fail.
    FailingMemory,
}

/// Test fixture for API testing.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub fetcher: Arc<MockFetcher>,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_store(StoreKind::File).await
    }

    pub async fn with_store(kind: StoreKind) -> Self {
        Self::with_options(kind, 0).await
    }

    /// Fixture whose passes pause `pace_ms` between channels.
    pub async fn with_options(kind: StoreKind, pace_ms: u64) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let registry_path = temp_dir.path().join("channels_config.json");
        std::fs::write(&registry_path, REGISTRY).expect("Failed to write registry");

        let mut config = Config {
            paths: PathsConfig {
                catalog: temp_dir.path().join("videos.json"),
                registry: registry_path,
                site_dir: temp_dir.path().join("dist"),
                static_assets: None,
            },
            ..Config::default()
        };
        config.sync.pace_ms = pace_ms;

        let store: Arc<dyn CatalogStore> = match kind {
            StoreKind::File => Arc::new(JsonFileStore::new(&config.paths.catalog)),
            StoreKind::FailingMemory => {
                let store = MemoryStore::new();
                store.set_fail_saves(true);
                Arc::new(store)
            }
        };

        let fetcher = Arc::new(MockFetcher::new());
        let state = Arc::new(AppState::new(config, store, fetcher.clone()));
        let router = vidcat_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            fetcher,
            temp_dir,
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.temp_dir.path().join("videos.json")
    }

    /// Write a catalog document directly.
    pub fn write_catalog(&self, catalog: &Catalog) {
        std::fs::write(
            self.catalog_path(),
            serde_json::to_vec_pretty(catalog).expect("Failed to serialize catalog"),
        )
        .expect("Failed to write catalog");
    }

    /// Give every registered channel a listing.
    pub async fn list_all(&self, ids: &[&str]) {
        for reference in [NPI, SUSD, MISHI] {
            self.fetcher
                .set_listing(reference, fixtures::fetched_entries(ids))
                .await;
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path).await
    }

    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path).await
    }

    async fn request(&self, method: &str, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
