//! Thin HTTP client for the generative AI REST API.
//!
//! - `generate_text` / `generate_image` post to `models/{model}:generateContent`.
//! - `submit_video` posts to `models/{model}:predictLongRunning` and returns the operation.
//! - `get_operation` re-reads an operation by its name.
//! - `download` fetches a finished asset with the API key appended.
//!
//! The submit → poll → download workflow lives in [`super::video`].
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::config::{Config, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL};
use crate::error::{AppError, AppResult, Upstream};
use crate::genai::types::{
    AssetReference, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Operation,
    PredictLongRunningRequest,
};
use crate::genai::video::PollPolicy;
use crate::utils::upstream;

const API_VERSION: &str = "v1beta";

#[derive(Clone)]
pub struct GenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
    video_model: String,
    pub(crate) poll_policy: PollPolicy,
}

impl GenAiClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        GenAiClient {
            client: Client::new(),
            base_url: base,
            api_key,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
            poll_policy: PollPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        GenAiClient {
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            video_model: config.video_model.clone(),
            poll_policy: PollPolicy {
                interval: config.poll_interval,
                max_polls: config.poll_max_attempts,
            },
            ..GenAiClient::new(config.genai_base_url.clone(), config.genai_api_key.clone())
        }
    }

    pub fn with_poll_policy(mut self, interval: Duration, max_polls: Option<u32>) -> Self {
        self.poll_policy = PollPolicy { interval, max_polls };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn video_model(&self) -> &str {
        &self.video_model
    }

    pub(crate) fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            tracing::error!("API_KEY is not set; generative AI calls are disabled");
            AppError::Configuration("Server configuration error: Missing API key.".to_string())
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/{}/models/{}:{}", self.base_url, API_VERSION, model, method)
    }

    /// Generate text for a prompt. Never returns an empty string.
    pub async fn generate_text(&self, prompt: &str) -> AppResult<String> {
        let key = self.api_key()?;
        require_prompt(prompt)?;

        let url = self.model_url(&self.text_model, "generateContent");
        tracing::info!("Generating text with model {}", self.text_model);
        let parsed = self.generate_content(&url, key, &GenerateContentRequest::from_prompt(prompt)).await?;

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(AppError::IncompleteResult("no text in response".to_string()));
        }
        Ok(text)
    }

    /// Generate one image and return it as a `data:` URI.
    pub async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let key = self.api_key()?;
        require_prompt(prompt)?;

        let url = self.model_url(&self.image_model, "generateContent");
        let body = GenerateContentRequest {
            generation_config: Some(GenerationConfig { response_modalities: vec!["IMAGE".to_string()] }),
            ..GenerateContentRequest::from_prompt(prompt)
        };
        tracing::info!("Generating image with model {}", self.image_model);
        let parsed = self.generate_content(&url, key, &body).await?;

        parsed
            .first_inline_data()
            .map(|blob| format!("data:{};base64,{}", blob.mime_type, blob.data))
            .ok_or_else(|| AppError::IncompleteResult("no image in response".to_string()))
    }

    async fn generate_content(
        &self,
        url: &str,
        key: &str,
        body: &GenerateContentRequest,
    ) -> AppResult<GenerateContentResponse> {
        let response = self.client.post(url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(upstream::failure(response, Upstream::GenAi, "Failed to generate content.").await)
        }
    }

    /// Submit a video generation job. Returns the (usually unfinished) operation.
    pub async fn submit_video(&self, body: &PredictLongRunningRequest) -> AppResult<Operation> {
        let key = self.api_key()?;
        let url = self.model_url(&self.video_model, "predictLongRunning");
        tracing::info!("Submitting video job to model {}", self.video_model);

        let response = self.client.post(&url)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            let operation: Operation = response.json().await.map_err(AppError::HttpClient)?;
            tracing::info!(operation = %operation.name, done = operation.done, "Video job submitted");
            Ok(operation)
        } else {
            Err(upstream::failure(response, Upstream::GenAi, "Failed to submit video generation.").await)
        }
    }

    /// Fetch the current state of an operation by name.
    pub async fn get_operation(&self, name: &str) -> AppResult<Operation> {
        let key = self.api_key()?;
        let url = format!("{}/{}/{}", self.base_url, API_VERSION, name.trim_start_matches('/'));

        let response = self.client.get(&url)
            .header("x-goog-api-key", key)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if response.status().is_success() {
            response.json().await.map_err(AppError::HttpClient)
        } else {
            Err(upstream::failure(response, Upstream::GenAi, "Failed to read operation status.").await)
        }
    }

    /// Download a generated asset. The link only works with `key` appended.
    ///
    /// Returns the bytes and the response `Content-Type`, if any.
    pub async fn download(&self, asset: &AssetReference) -> AppResult<(Vec<u8>, Option<String>)> {
        let key = self.api_key()?;
        let url = authorized_download_url(&asset.uri, key)?;
        tracing::info!("Downloading generated asset");

        let response = self.client.get(url)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "asset download failed");
            return Err(AppError::upstream(
                Upstream::GenAi,
                Some(status.as_u16()),
                format!("download failed: {}", status),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().await.map(|b| b.to_vec()).map_err(AppError::HttpClient)?;
        Ok((bytes, content_type))
    }
}

fn require_prompt(prompt: &str) -> AppResult<()> {
    if prompt.trim().is_empty() {
        return Err(AppError::Validation("Prompt is required.".to_string()));
    }
    Ok(())
}

/// Append the access credential as the `key` query parameter.
pub(crate) fn authorized_download_url(uri: &str, key: &str) -> AppResult<Url> {
    let mut url = Url::parse(uri)
        .map_err(|e| AppError::IncompleteResult(format!("invalid download link: {}", e)))?;
    url.query_pairs_mut().append_pair("key", key);
    Ok(url)
}

/// Base64 payload for a seed image, as the submission endpoint expects it.
pub(crate) fn encode_seed_image(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
