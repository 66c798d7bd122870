//! HTTP API for on-demand audio downloads.
//!
//! Two routes: a health probe and `GET /download?url=...&quality=...`, which
//! runs the extraction and streams the resulting file back. The temp
//! artifact travels with the response body and is removed once the body has
//! been fully transmitted or abandoned.

mod error;

pub use error::{ApiError, ErrorResponse};

use crate::config::Settings;
use crate::download::{self, TempArtifact};
use crate::quality::Quality;
use axum::body::{Body, Bytes};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::Stream;
use serde::Deserialize;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use url::Url;

const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Shared application state.
pub struct AppState {
    pub settings: Settings,
}

/// Build the application router.
pub fn router(settings: Settings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/download", get(download))
        .layer(cors)
        .with_state(Arc::new(AppState { settings }))
}

/// Validated query parameters for a download request.
#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Url,
    pub quality: Quality,
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn download(
    State(state): State<Arc<AppState>>,
    params: Result<Query<DownloadParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    if !matches!(params.url.scheme(), "http" | "https") {
        return Err(ApiError::BadRequest(format!(
            "Unsupported URL scheme: {}",
            params.url.scheme()
        )));
    }

    info!("Download requested: {} | quality: {}", params.url, params.quality);

    let audio = download::fetch_audio(
        &params.url,
        params.quality,
        &state.settings.temp_dir(),
        &state.settings.download,
    )
    .await?;

    info!("Serving {}", audio.filename);
    serve_artifact(audio.path, &audio.filename).await
}

/// Builds the file response. The artifact guard is moved into the body
/// stream, so the file is deleted only after the last chunk has been sent
/// (or the connection dropped).
async fn serve_artifact(path: std::path::PathBuf, filename: &str) -> Result<Response, ApiError> {
    let artifact = TempArtifact::new(path);

    let file = tokio::fs::File::open(artifact.path())
        .await
        .map_err(|e| ApiError::Internal(format!("Cannot open result file: {e}")))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Cannot stat result file: {e}")))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .body(Body::from_stream(file_stream(file, artifact)))
        .map_err(|e| ApiError::Internal(format!("Cannot build response: {e}")))
}

/// Chunked read of the artifact. The guard rides along in the stream state
/// and drops (removing the file) when the stream finishes or is abandoned.
fn file_stream(
    file: tokio::fs::File,
    artifact: TempArtifact,
) -> impl Stream<Item = std::io::Result<Bytes>> {
    futures::stream::try_unfold((file, artifact), |(mut file, artifact)| async move {
        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some((Bytes::from(buf), (file, artifact))))
    })
}

/// Attachment header for the derived filename, degrading to an ASCII-only
/// name when the title cannot be represented as a header value.
fn content_disposition(filename: &str) -> HeaderValue {
    let safe = filename.replace('"', "'");

    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\"")).unwrap_or_else(|_| {
        let ascii: String = safe
            .chars()
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();
        HeaderValue::from_str(&format!("attachment; filename=\"{ascii}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serve_artifact_deletes_after_body_consumed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.m4a");
        std::fs::write(&path, b"fake audio bytes").unwrap();

        let response = serve_artifact(path.clone(), "song.m4a").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "16"
        );

        // File must survive until the body is consumed.
        assert!(path.exists());

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"fake audio bytes");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_serve_artifact_deletes_on_abandoned_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"x").unwrap();

        let response = serve_artifact(path.clone(), "song.mp3").await.unwrap();
        drop(response);

        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_download_rejects_non_http_schemes() {
        let state = Arc::new(AppState {
            settings: Settings::default(),
        });
        let params = DownloadParams {
            url: Url::parse("ftp://example.com/file").unwrap(),
            quality: Quality::M4a,
        };

        let err = download(State(state), Ok(Query(params))).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_content_disposition_plain() {
        let value = content_disposition("My Song.mp3");
        assert_eq!(value, "attachment; filename=\"My Song.mp3\"");
    }

    #[test]
    fn test_content_disposition_quotes_and_non_ascii() {
        let value = content_disposition("a \"b\".mp3");
        assert_eq!(value, "attachment; filename=\"a 'b'.mp3\"");

        let value = content_disposition("grüße.mp3");
        assert_eq!(value, "attachment; filename=\"gre.mp3\"");
    }
}
