//! HTTP error mapping.
//!
//! Handlers return `Result<T, ApiError>`; the `IntoResponse` impl converts
//! each classification into a status code and a `{detail}` JSON body.
//! Internal detail is logged server-side and never sent to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::HentError;

/// Structured error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Request-level error classifications.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed query parameters; the message is safe to expose.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The extractor rejected the source URL (client-caused).
    #[error("source rejected: {0}")]
    Source(String),

    /// Anything else; detail stays in the log.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HentError> for ApiError {
    fn from(e: HentError) -> Self {
        match e {
            HentError::SourceRejected(detail) => ApiError::Source(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Source(full) => {
                warn!(detail = %full, "source rejected by extractor");
                (
                    StatusCode::BAD_REQUEST,
                    "The source URL could not be processed. It may be invalid or the media unavailable.".to_string(),
                )
            }
            ApiError::Internal(full) => {
                error!(detail = %full, "internal error during download");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred while processing the download.".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = ApiError::BadRequest("oops".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Source("ERROR: unsupported URL".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::Internal("disk on fire".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_classification_from_hent_error() {
        let api: ApiError = HentError::SourceRejected("bad url".into()).into();
        assert!(matches!(api, ApiError::Source(_)));

        let api: ApiError = HentError::OutputMissing("gone".into()).into();
        assert!(matches!(api, ApiError::Internal(_)));

        let api: ApiError = HentError::ToolNotFound("yt-dlp".into()).into();
        assert!(matches!(api, ApiError::Internal(_)));
    }
}
