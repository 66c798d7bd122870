//! Download orchestration.
//!
//! This module turns a validated URL plus a quality selector into an audio
//! file on disk. Extraction and transcoding are delegated to yt-dlp (and
//! ffmpeg for the transcode profiles); the orchestrator's own job is naming,
//! argument construction, locating the result, and cleanup.

use crate::config::DownloadSettings;
use crate::error::{HentError, Result};
use crate::quality::Quality;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A successfully fetched audio file, ready to serve.
#[derive(Debug)]
pub struct DownloadedAudio {
    /// Location of the artifact in the temp directory.
    pub path: PathBuf,
    /// Human-friendly download filename, `<sanitized title>.<ext>`.
    pub filename: String,
}

/// Fetches audio for `url` at the requested quality into `temp_dir`.
///
/// Each call gets a fresh UUID as its temp-file name stem, so concurrent
/// requests never collide in the shared directory. The yt-dlp child process
/// is awaited on the runtime; nothing here blocks the request-handling
/// threads. There is no cancellation: once spawned, the tool runs to
/// completion even if the caller goes away.
#[instrument(skip(url, temp_dir, settings), fields(quality = %quality))]
pub async fn fetch_audio(
    url: &url::Url,
    quality: Quality,
    temp_dir: &Path,
    settings: &DownloadSettings,
) -> Result<DownloadedAudio> {
    std::fs::create_dir_all(temp_dir)?;

    let id = Uuid::new_v4();
    let profile = quality.profile();
    let template = temp_dir.join(format!("{}.%(ext)s", id));

    info!("Fetching audio from {}", url);

    let args = build_args(quality, &template, &settings.player_client, url.as_str());

    let result = Command::new(&settings.ytdlp_bin)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HentError::ToolNotFound(settings.ytdlp_bin.clone()));
        }
        Err(e) => {
            return Err(HentError::Extractor(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("yt-dlp rejected {}: {}", url, stderr.trim());
        return Err(HentError::SourceRejected(stderr.trim().to_string()));
    }

    let title = extract_title(&output.stdout);
    let path = find_output_file(temp_dir, &id.to_string(), profile.ext)?;

    // The served extension reflects what the tool actually produced, which
    // for the passthrough profile can differ from the expected one.
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or(profile.ext);
    let filename = format!("{}.{}", sanitize_title(&title), ext);

    debug!("Resolved {} as {:?}", filename, path);
    Ok(DownloadedAudio { path, filename })
}

/// Builds the yt-dlp argument vector for one request.
fn build_args(quality: Quality, template: &Path, player_client: &str, url: &str) -> Vec<String> {
    let profile = quality.profile();

    let mut args = vec![
        "--quiet".to_string(),
        "--no-warnings".to_string(),
        "--no-playlist".to_string(),
        "--no-check-certificates".to_string(),
        // Emits the info JSON on stdout while still downloading.
        "--print-json".to_string(),
        "--output".to_string(),
        template.to_string_lossy().into_owned(),
        "--format".to_string(),
        profile.format.to_string(),
        "--extractor-args".to_string(),
        format!("youtube:player_client={}", player_client),
    ];

    if let Some(codec) = profile.codec {
        args.push("--extract-audio".to_string());
        args.push("--audio-format".to_string());
        args.push(codec.to_string());

        if let Some(bitrate) = profile.bitrate {
            args.push("--audio-quality".to_string());
            args.push(bitrate.to_string());
        }
    }

    args.push(url.to_string());
    args
}

/// Pulls the title out of the info JSON printed on stdout.
///
/// A missing or unparseable title degrades to a generic stem rather than
/// failing a download that already succeeded.
fn extract_title(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(stdout);

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(line) {
            if let Some(title) = json["title"].as_str() {
                return title.to_string();
            }
        }
    }

    "audio".to_string()
}

/// Locates the file the extractor wrote for this request.
///
/// The expected `<id>.<ext>` path is checked first; the post-processors
/// normally land exactly there. Otherwise the directory is scanned for the
/// UUID prefix, with matches sorted so the pick is stable even when the
/// listing order is not.
fn find_output_file(dir: &Path, id: &str, ext: &str) -> Result<PathBuf> {
    let expected = dir.join(format!("{}.{}", id, ext));
    if expected.exists() {
        return Ok(expected);
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| HentError::OutputMissing(format!("Cannot read temp directory: {e}")))?;

    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(id))
        .map(|entry| entry.path())
        .collect();
    matches.sort();

    matches.into_iter().next().ok_or_else(|| {
        HentError::OutputMissing(format!("No file with stem {} after extraction", id))
    })
}

/// Strips path separators from an extracted title so it is safe to use as a
/// download filename.
fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "audio".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Owns a temp artifact and removes it on drop.
///
/// The server hands this to the response body, so the file outlives the
/// transmission and disappears right after it. Removal failures are logged,
/// never surfaced; the response is already gone by then.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temp file {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temp file {:?}: {}", self.path, e),
        }
    }
}
