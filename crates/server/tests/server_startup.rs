use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Config pointing every document into `dir`
fn minimal_config(port: u16, dir: &Path) -> String {
    format!(
        r#"
[paths]
catalog = "{catalog}"
registry = "{registry}"
site_dir = "{site}"

[fetcher.yt_dlp]
binary = "/nonexistent/yt-dlp"

[server]
host = "127.0.0.1"
port = {port}
"#,
        catalog = dir.join("videos.json").display(),
        registry = dir.join("channels_config.json").display(),
        site = dir.join("dist").display(),
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn write_registry(dir: &Path) {
    std::fs::write(
        dir.join("channels_config.json"),
        r#"{"ingles": {"Rahdo": "https://www.youtube.com/@rahdo"}, "espanol": {}}"#,
    )
    .unwrap();
}

async fn run_command(config_path: &Path, args: &[&str]) -> std::process::Output {
    timeout(
        Duration::from_secs(10),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_vidcat"))
            .env("VIDCAT_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .args(args)
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command")
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_vidcat"))
        .arg("serve")
        .env("VIDCAT_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_serve_health_and_videos() {
    let dir = TempDir::new().unwrap();
    write_registry(dir.path());
    let port = get_available_port();
    let config = write_config(&minimal_config(port, dir.path()));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let health: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(health["status"], "ok");

    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/videos", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let videos: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(videos["ingles"].is_object());

    let config_json: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config_json["server"]["port"], port);

    // Cleanup
    server.kill().await.ok();
}

#[tokio::test]
async fn test_check_config_prints_sanitized() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&minimal_config(get_available_port(), dir.path()));

    let output = run_command(config.path(), &["check-config"]).await;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["sync"]["check_window"], 10);
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let output = run_command(Path::new("/nonexistent/vidcat.toml"), &["check-config"]).await;
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let config = write_config("[sync]\nretention_cap = 0\n");
    let output = run_command(config.path(), &["check-config"]).await;
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_sync_without_backend_exits_with_error() {
    let dir = TempDir::new().unwrap();
    write_registry(dir.path());
    let config = write_config(&minimal_config(get_available_port(), dir.path()));

    let output = run_command(config.path(), &["sync"]).await;

    assert!(!output.status.success());
    assert!(!dir.path().join("videos.json").exists());
}

#[tokio::test]
async fn test_build_site_requires_catalog() {
    let dir = TempDir::new().unwrap();
    write_registry(dir.path());
    let config = write_config(&minimal_config(get_available_port(), dir.path()));

    let output = run_command(config.path(), &["build-site"]).await;
    assert!(!output.status.success());

    std::fs::write(dir.path().join("videos.json"), r#"{"ingles": {"Rahdo": []}}"#).unwrap();
    let out = dir.path().join("public");
    let output = run_command(
        config.path(),
        &["build-site", "--out", out.to_str().unwrap()],
    )
    .await;

    assert!(output.status.success());
    assert!(out.join("index.html").exists());
    assert!(out.join("videos.json").exists());
}
