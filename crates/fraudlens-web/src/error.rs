//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use fraudlens_llm::LlmError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Shown on the dashboard when an unretried inference call fails.
pub const ANALYSIS_FAILED: &str = "The analysis service did not return a result. Please try again.";

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("{0}")]
    BadUpload(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Llm(_)       => StatusCode::BAD_GATEWAY,
            WebError::BadUpload(_) => StatusCode::BAD_REQUEST,
            WebError::Template(_)  => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WebError::Llm(e)       => e.kind(),
            WebError::BadUpload(_) => "bad_upload",
            WebError::Template(_)  => "template",
        }
    }

    /// Banner text for the HTML dashboard. Backend detail stays in the log.
    pub fn banner(&self) -> String {
        match self {
            WebError::BadUpload(msg) => msg.clone(),
            _ => ANALYSIS_FAILED.to_string(),
        }
    }

    pub(crate) fn log(&self) {
        if self.status().is_server_error() {
            error!(kind = self.kind(), "Request failed: {self}");
        } else {
            warn!(kind = self.kind(), "Request rejected: {self}");
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_failures_map_to_bad_gateway() {
        let err = WebError::from(LlmError::RateLimited("slow down".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), "rate_limited");
        assert_eq!(err.banner(), ANALYSIS_FAILED);
    }

    #[test]
    fn test_bad_upload_is_client_error_with_own_message() {
        let err = WebError::BadUpload("only png, jpg and jpeg files are accepted".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.banner(), "only png, jpg and jpeg files are accepted");
    }
}
