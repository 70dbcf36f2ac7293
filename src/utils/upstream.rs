//! Normalization of non-success upstream responses.
use reqwest::Response;
use serde_json::Value;

use crate::error::{AppError, Upstream};

/// Pull `error.message` out of an upstream error body.
///
/// Both collaborators wrap failures as `{"error": {"message": ...}}`; a bare
/// string under `error` is accepted as well.
pub fn extract_error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .filter(|m| !m.is_empty())
        .map(String::from)
}

/// Consume a failed response and turn it into an [`AppError::Upstream`].
///
/// The upstream's own message wins; `fallback` is used when the body is not
/// JSON or carries no message.
pub async fn failure(response: Response, service: Upstream, fallback: &str) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| fallback.to_string());
    tracing::error!(
        upstream = %service,
        status = status.as_u16(),
        body = %text,
        "upstream request failed"
    );
    AppError::upstream(service, Some(status.as_u16()), message)
}
