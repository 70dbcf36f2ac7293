//! Publishing adapter for the Graph API.
//!
//! Text-only posts go to `/{target}/feed` as a form-urlencoded body carrying
//! the access token. Posts with an image go to `/{target}/photos` as multipart
//! with the access token in the query string; the endpoint does not accept it
//! inside the multipart body.
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::config::{Config, DEFAULT_GRAPH_API_URL};
use crate::error::{AppError, AppResult, Upstream};
use crate::publish::types::{PhotoResponse, PublishRequest, PublishResult};
use crate::utils::data_url::{self, InlineData};
use crate::utils::upstream;

const TEXT_POST_FALLBACK: &str = "Failed to post to Facebook.";
const IMAGE_POST_FALLBACK: &str = "Failed to post image to Facebook.";

#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl Default for GraphClient {
    fn default() -> Self {
        GraphClient::new(DEFAULT_GRAPH_API_URL.to_string(), None)
    }
}

impl GraphClient {
    pub fn new(base_url: String, access_token: Option<String>) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        GraphClient { client: Client::new(), base_url: base, access_token }
    }

    pub fn from_config(config: &Config) -> Self {
        GraphClient::new(config.graph_api_url.clone(), config.graph_access_token.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn access_token(&self) -> AppResult<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            tracing::error!("FB_ACCESS_TOKEN is not set in environment variables.");
            AppError::Configuration("Server configuration error: Missing API token.".to_string())
        })
    }

    /// `{base}/{target}/{edge}`, with the target escaped as one path segment.
    fn edge_url(&self, target_id: &str, edge: &str) -> AppResult<Url> {
        let invalid = || AppError::Configuration(format!("Invalid GRAPH_API_URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(target_id)
            .push(edge);
        Ok(url)
    }

    /// Publish a post, choosing the photo or feed path by whether images are present.
    ///
    /// # Errors
    ///
    /// - `Configuration` if no access token is configured
    /// - `Validation` if `target_id` or `message` is empty, or the image reference is unusable
    /// - `Upstream` from the image host when an http(s) image cannot be fetched
    /// - `Upstream` with the upstream's error message on a non-success status
    pub async fn publish(&self, request: &PublishRequest) -> AppResult<PublishResult> {
        let token = self.access_token()?;
        let target_id = request.target_id.as_str();
        if target_id.is_empty() || request.message.is_empty() {
            return Err(AppError::Validation("Missing targetId or message in request body.".to_string()));
        }

        match request.image_urls.first() {
            Some(image_url) => {
                if request.image_urls.len() > 1 {
                    tracing::debug!(ignored = request.image_urls.len() - 1, "only the first image is published");
                }
                let image = self.materialize_image(image_url).await?;
                self.post_photo(token, target_id, &request.message, image).await
            }
            None => self.post_text(token, target_id, &request.message).await,
        }
    }

    async fn post_text(&self, token: &str, target_id: &str, message: &str) -> AppResult<PublishResult> {
        let url = self.edge_url(target_id, "feed")?;
        tracing::info!(target_id, "Publishing text post");

        let response = self.client.post(url)
            .form(&[("access_token", token), ("message", message)])
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if !response.status().is_success() {
            return Err(upstream::failure(response, Upstream::Graph, TEXT_POST_FALLBACK).await);
        }

        let body: Value = response.json().await.map_err(AppError::HttpClient)?;
        let result: PublishResult = serde_json::from_value(body)
            .map_err(|_| AppError::IncompleteResult("feed response carried no post id".to_string()))?;
        tracing::info!(target_id, post_id = %result.id, "Text post published");
        Ok(result)
    }

    async fn post_photo(
        &self,
        token: &str,
        target_id: &str,
        message: &str,
        image: InlineData,
    ) -> AppResult<PublishResult> {
        let mut url = self.edge_url(target_id, "photos")?;
        url.query_pairs_mut().append_pair("access_token", token);
        tracing::info!(target_id, bytes = image.bytes.len(), mime = %image.mime_type, "Publishing photo post");

        let file_name = image.file_name("upload");
        let InlineData { mime_type, bytes } = image;
        let source = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|_| AppError::Validation(format!("unsupported image type: {}", mime_type)))?;
        let form = Form::new()
            .text("caption", message.to_string())
            .part("source", source);

        let response = self.client.post(url)
            .multipart(form)
            .send()
            .await
            .map_err(AppError::HttpClient)?;

        if !response.status().is_success() {
            return Err(upstream::failure(response, Upstream::Graph, IMAGE_POST_FALLBACK).await);
        }

        let body: PhotoResponse = response.json().await.map_err(AppError::HttpClient)?;
        let result = body
            .into_result()
            .ok_or_else(|| AppError::IncompleteResult("photo response carried no post id".to_string()))?;
        tracing::info!(target_id, post_id = %result.id, "Photo post published");
        Ok(result)
    }

    /// Turn an image reference into bytes: decode a `data:` URI, or GET an http(s) URL.
    async fn materialize_image(&self, image_url: &str) -> AppResult<InlineData> {
        if data_url::is_data_url(image_url) {
            return data_url::decode(image_url);
        }

        let url = Url::parse(image_url.trim())
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https"))
            .ok_or_else(|| AppError::Validation("image URL must be a data URL or http(s) URL".to_string()))?;

        let response = self.client.get(url)
            .send()
            .await
            .map_err(AppError::HttpClient)?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(
                Upstream::ImageHost,
                Some(status.as_u16()),
                format!("could not fetch image: {}", status),
            ));
        }
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = response.bytes().await.map(|b| b.to_vec()).map_err(AppError::HttpClient)?;
        Ok(InlineData { mime_type, bytes })
    }
}
