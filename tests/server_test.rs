// Integration test for the download server.
//
// Runs the real router against a stub yt-dlp executable, so the whole
// request-to-file-to-cleanup flow is exercised without touching the network.

#![cfg(unix)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hent::config::Settings;
use hent::server;

/// Stub yt-dlp: honors `--output` and `--audio-format`, prints an info JSON
/// with a title containing a path separator, and fails for URLs that mention
/// "unavailable".
const STUB_YTDLP: &str = r#"#!/bin/sh
ext="m4a"
out=""
prev=""
for a in "$@"; do
  case "$prev" in
    --output) out="$a" ;;
    --audio-format) ext="$a" ;;
  esac
  prev="$a"
done
case "$prev" in
  *unavailable*) echo "ERROR: [generic] Unsupported URL" >&2; exit 1 ;;
esac
path=$(printf '%s' "$out" | sed "s/%(ext)s/$ext/")
printf 'stub audio payload' > "$path"
printf '{"title": "Stub/Title"}\n'
"#;

fn write_stub(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp-stub");
    std::fs::write(&path, STUB_YTDLP).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Start the server with a stub extractor; returns its address and the temp
/// directory the artifacts land in.
async fn start_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let stub = write_stub(dir.path());

    let mut settings = Settings::default();
    settings.general.temp_dir = dir.path().join("work").display().to_string();
    settings.download.ytdlp_bin = stub.display().to_string();

    let app = server::router(settings);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, dir)
}

/// Wait for deferred cleanup to empty the work directory.
async fn assert_work_dir_empties(dir: &Path) {
    let work = dir.join("work");
    for _ in 0..50 {
        let leftover = std::fs::read_dir(&work)
            .map(|entries| entries.count())
            .unwrap_or(0);
        if leftover == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("temp artifacts were not cleaned up in {:?}", work);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (addr, _dir) = start_server().await;

    let resp = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_download_m4a_success() {
    let (addr, dir) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/download", addr))
        .query(&[("url", "https://example.com/watch?v=ok"), ("quality", "m4a")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );

    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    // Title path separator must be sanitized away.
    assert!(disposition.contains("Stub_Title.m4a"), "{}", disposition);

    let body = resp.bytes().await.unwrap();
    assert_eq!(&body[..], b"stub audio payload");

    assert_work_dir_empties(dir.path()).await;
}

#[tokio::test]
async fn test_download_mp3_gets_mp3_extension() {
    let (addr, dir) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/download", addr))
        .query(&[("url", "https://example.com/song"), ("quality", "mp3_320")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.ends_with(".mp3\""), "{}", disposition);

    resp.bytes().await.unwrap();
    assert_work_dir_empties(dir.path()).await;
}

#[tokio::test]
async fn test_unavailable_source_is_client_error() {
    let (addr, _dir) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/download", addr))
        .query(&[
            ("url", "https://example.com/unavailable"),
            ("quality", "flac"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    let detail = body["detail"].as_str().unwrap();
    assert!(!detail.is_empty());
    // Internal extractor output must not leak to the caller.
    assert!(!detail.contains("Unsupported URL"));
}

#[tokio::test]
async fn test_invalid_quality_is_rejected_before_orchestration() {
    let (addr, _dir) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/download", addr))
        .query(&[("url", "https://example.com/song"), ("quality", "wav")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(!body["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_non_http_scheme_is_rejected() {
    let (addr, _dir) = start_server().await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/download", addr))
        .query(&[("url", "ftp://example.com/song"), ("quality", "m4a")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_concurrent_downloads_do_not_collide() {
    let (addr, dir) = start_server().await;
    let client = reqwest::Client::new();

    let a = client
        .get(format!("http://{}/download", addr))
        .query(&[("url", "https://example.com/a"), ("quality", "m4a")])
        .send();
    let b = client
        .get(format!("http://{}/download", addr))
        .query(&[("url", "https://example.com/b"), ("quality", "mp3_192")])
        .send();

    let (a, b) = tokio::join!(a, b);
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.status(), 200);
    assert_eq!(b.status(), 200);

    assert_eq!(&a.bytes().await.unwrap()[..], b"stub audio payload");
    assert_eq!(&b.bytes().await.unwrap()[..], b"stub audio payload");

    assert_work_dir_empties(dir.path()).await;
}
