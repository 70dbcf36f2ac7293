//! Axum request handlers for the HTTP API.
use axum::extract::State;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::extract::ValidatedJson;
use crate::api::routes::AppState;
use crate::error::{AppError, AppResult};
use crate::genai::GenerationRequest;
use crate::publish::{PublishRequest, PublishResult};
use crate::utils::data_url;
use crate::utils::lenient::null_as_default;

pub async fn root() -> &'static str {
    "GenAI Social Proxy"
}

#[derive(Debug, Deserialize)]
pub struct PromptBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
}

pub async fn generate_text(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<PromptBody>,
) -> AppResult<Json<Value>> {
    let text = state.genai.generate_text(&body.prompt).await?;
    Ok(Json(json!({ "text": text })))
}

pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<PromptBody>,
) -> AppResult<Json<Value>> {
    let image = state.genai.generate_image(&body.prompt).await?;
    Ok(Json(json!({ "image": image })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64 image bytes; a full `data:` URI is accepted too.
    pub image_bytes: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

impl VideoBody {
    fn into_request(self) -> AppResult<GenerationRequest> {
        let request = GenerationRequest::new(self.prompt);
        let Some(image) = self.image else {
            return Ok(request);
        };

        if data_url::is_data_url(&image.image_bytes) {
            let decoded = data_url::decode(&image.image_bytes)?;
            let mime_type = image.mime_type.unwrap_or(decoded.mime_type);
            return Ok(request.with_seed_image(decoded.bytes, mime_type));
        }

        let bytes = BASE64
            .decode(image.image_bytes.trim().as_bytes())
            .map_err(|e| AppError::Validation(format!("image.imageBytes is not valid base64: {}", e)))?;
        let mime_type = image
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| AppError::Validation("image.mimeType is required.".to_string()))?;
        Ok(request.with_seed_image(bytes, mime_type))
    }
}

/// Responds with the video bytes; `x-asset-id` carries the handle id for log correlation.
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<VideoBody>,
) -> AppResult<Response> {
    let request = body.into_request()?;
    let video = state.genai.generate_video(&request).await?;

    let headers = [
        (CONTENT_TYPE, video.mime_type().to_string()),
        (HeaderName::from_static("x-asset-id"), video.id().to_string()),
    ];
    Ok((headers, video.into_bytes()).into_response())
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<PublishRequest>,
) -> AppResult<Json<PublishResult>> {
    state.graph.publish(&body).await.map(Json)
}
