//! Video generation: submit a long-running job, poll it to completion, then
//! download the result and hand it to the caller as a [`VideoAsset`].
//!
//! Polls run strictly one after another with a fixed sleep in between. The
//! number of polls is capped by [`PollPolicy::max_polls`]; exceeding it fails
//! with [`AppError::Timeout`]. A policy without a cap keeps polling until the
//! upstream reports `done`.
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_MAX_ATTEMPTS};
use crate::error::{AppError, AppResult, Upstream};
use crate::genai::client::{encode_seed_image, GenAiClient};
use crate::genai::types::{InstanceImage, PredictLongRunningRequest, VideoInstance, VideoParameters};

const FALLBACK_VIDEO_MIME: &str = "video/mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_polls: Some(DEFAULT_POLL_MAX_ATTEMPTS),
        }
    }
}

/// Optional first frame for image-to-video generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedImage {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub seed_image: Option<SeedImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest { prompt: prompt.into(), seed_image: None }
    }

    pub fn with_seed_image(mut self, image_bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        self.seed_image = Some(SeedImage { image_bytes, mime_type: mime_type.into() });
        self
    }

    fn to_wire(&self) -> PredictLongRunningRequest {
        PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: self.prompt.clone(),
                image: self.seed_image.as_ref().map(|img| InstanceImage {
                    bytes_base64_encoded: encode_seed_image(&img.image_bytes),
                    mime_type: img.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters { sample_count: 1 },
        }
    }
}

/// A downloaded video, owned by whoever holds it.
///
/// Dropping the handle frees the bytes; [`VideoAsset::into_bytes`] hands them
/// over instead.
#[derive(Debug)]
pub struct VideoAsset {
    id: Uuid,
    mime_type: String,
    bytes: Vec<u8>,
}

impl VideoAsset {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        VideoAsset { id: Uuid::new_v4(), mime_type: mime_type.into(), bytes }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl GenAiClient {
    /// Run a video job end to end.
    ///
    /// # Errors
    ///
    /// - `Configuration` if no API key is configured
    /// - `Validation` for an empty prompt
    /// - `Upstream` if submission, a poll, or the download is rejected, or the
    ///   finished operation reports an error
    /// - `Timeout` if the job is still running after `max_polls` polls
    /// - `IncompleteResult` if the finished operation has no download link
    pub async fn generate_video(&self, request: &GenerationRequest) -> AppResult<VideoAsset> {
        self.api_key()?;
        if request.prompt.trim().is_empty() {
            return Err(AppError::Validation("Prompt is required.".to_string()));
        }

        let policy = self.poll_policy;
        let mut operation = self.submit_video(&request.to_wire()).await?;
        let started = Instant::now();
        let mut polls: u32 = 0;

        while !operation.done {
            if let Some(max) = policy.max_polls {
                if polls >= max {
                    let waited = started.elapsed();
                    tracing::error!(operation = %operation.name, polls, ?waited, "video job did not finish");
                    return Err(AppError::Timeout { polls, waited });
                }
            }
            tokio::time::sleep(policy.interval).await;
            operation = self.get_operation(&operation.name).await?;
            polls += 1;
            tracing::debug!(operation = %operation.name, polls, done = operation.done, "polled video job");
        }
        tracing::info!(operation = %operation.name, polls, elapsed = ?started.elapsed(), "Video job finished");

        if let Some(err) = &operation.error {
            let message = err
                .message
                .clone()
                .unwrap_or_else(|| "Video generation failed.".to_string());
            return Err(AppError::upstream(Upstream::GenAi, None, message));
        }

        let asset = operation
            .asset_reference()
            .ok_or_else(|| AppError::IncompleteResult("no download link".to_string()))?;

        let (bytes, content_type) = self.download(&asset).await?;
        let mime_type = asset
            .mime_type
            .or(content_type)
            .unwrap_or_else(|| FALLBACK_VIDEO_MIME.to_string());
        let video = VideoAsset::new(mime_type, bytes);
        tracing::info!(asset = %video.id(), bytes = video.len(), "Video downloaded");
        Ok(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seed_image_is_serialized_only_when_present() {
        let plain = serde_json::to_value(GenerationRequest::new("waves").to_wire()).unwrap();
        assert_eq!(plain["instances"][0], json!({"prompt": "waves"}));
        assert_eq!(plain["parameters"]["sampleCount"], 1);

        let seeded = GenerationRequest::new("waves").with_seed_image(b"hi".to_vec(), "image/png");
        let wire = serde_json::to_value(seeded.to_wire()).unwrap();
        assert_eq!(
            wire["instances"][0]["image"],
            json!({"bytesBase64Encoded": "aGk=", "mimeType": "image/png"})
        );
    }

    #[test]
    fn video_asset_releases_bytes() {
        let asset = VideoAsset::new("video/mp4", vec![1, 2, 3]);
        assert_eq!(asset.mime_type(), "video/mp4");
        assert_eq!(asset.len(), 3);
        assert_eq!(asset.into_bytes(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_key_fails_before_submission() {
        let client = GenAiClient::new("http://127.0.0.1:9".to_string(), None);
        let err = client.generate_video(&GenerationRequest::new("waves")).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
