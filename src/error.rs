//! Common error type and alias.
//!
//! Every operation in the crate reports failures through [`AppError`]. The
//! HTTP layer renders it via `IntoResponse`; the CLI prints its `Display`.
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Duration;

pub type AppResult<T> = Result<T, AppError>;

/// Which external collaborator produced an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    GenAi,
    Graph,
    /// Host serving an image referenced by URL in a publish request.
    ImageHost,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upstream::GenAi => f.write_str("generative AI service"),
            Upstream::Graph => f.write_str("publishing service"),
            Upstream::ImageHost => f.write_str("image host"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A credential or setting required by the operation is missing.
    #[error("{0}")]
    Configuration(String),

    /// The caller's request is missing a required field or is malformed.
    #[error("{0}")]
    Validation(String),

    /// The upstream answered with a non-success status. `message` is the
    /// upstream's own error text when it provided one.
    #[error("{message}")]
    Upstream {
        service: Upstream,
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The upstream reported success but the payload lacks the expected result.
    #[error("{0}")]
    IncompleteResult(String),

    #[error("operation still running after {polls} polls ({waited:?})")]
    Timeout { polls: u32, waited: Duration },
}

impl AppError {
    pub fn upstream(service: Upstream, status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Upstream { service, status, message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } | AppError::HttpClient(_) | AppError::IncompleteResult(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message safe to hand to the caller.
    ///
    /// Validation, configuration and upstream messages pass through as-is;
    /// transport-level failures are replaced by a generic line and only show
    /// up in `detail`.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Configuration(_) | AppError::Validation(_) | AppError::Upstream { .. } => {
                self.to_string()
            }
            AppError::HttpClient(_) => "Could not reach the upstream service.".to_string(),
            AppError::IncompleteResult(_) => "The upstream service returned no usable result.".to_string(),
            AppError::Timeout { .. } => "The generation job did not finish in time.".to_string(),
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::Configuration(_) | AppError::Validation(_) => None,
            AppError::Upstream { service, status, .. } => Some(match status {
                Some(code) => format!("{} responded with status {}", service, code),
                None => format!("{} reported a failed operation", service),
            }),
            other => Some(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let body = match self.detail() {
            Some(detail) => json!({ "error": self.client_message(), "detail": detail }),
            None => json!({ "error": self.client_message() }),
        };
        (status, Json(body)).into_response()
    }
}
