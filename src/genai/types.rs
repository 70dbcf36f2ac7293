//! Request and response bodies for the generative AI REST endpoints.
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---- generateContent ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        GenerateContentRequest {
            contents: vec![Content { parts: vec![TextPart { text: prompt.to_string() }] }],
            generation_config: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineBlob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineBlob {
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.first_parts().iter().filter_map(|p| p.text.as_deref()).collect()
    }

    pub fn first_inline_data(&self) -> Option<&InlineBlob> {
        self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
    }
}

// ---- predictLongRunning ----

#[derive(Debug, Serialize)]
pub struct PredictLongRunningRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<InstanceImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceImage {
    pub bytes_base64_encoded: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
}

/// A long-running operation as returned by submission and status polling.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Where a finished video can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub uri: String,
    pub mime_type: Option<String>,
}

impl Operation {
    /// First generated video reference of a finished operation.
    ///
    /// The REST API nests samples under `generateVideoResponse.generatedSamples`;
    /// the SDK-shaped `generatedVideos` is accepted too.
    pub fn asset_reference(&self) -> Option<AssetReference> {
        let response = self.response.as_ref()?;
        let video = response
            .pointer("/generateVideoResponse/generatedSamples/0/video")
            .or_else(|| response.pointer("/generatedVideos/0/video"))?;
        let uri = video.get("uri").and_then(Value::as_str).filter(|u| !u.is_empty())?;
        Some(AssetReference {
            uri: uri.to_string(),
            mime_type: video.get("mimeType").and_then(Value::as_str).map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_instance_omits_absent_image() {
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance { prompt: "a cat".into(), image: None }],
            parameters: VideoParameters { sample_count: 1 },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"instances": [{"prompt": "a cat"}], "parameters": {"sampleCount": 1}})
        );
    }

    #[test]
    fn operation_defaults_to_not_done() {
        let op: Operation = serde_json::from_value(json!({"name": "operations/1"})).unwrap();
        assert!(!op.done);
        assert!(op.asset_reference().is_none());
    }

    #[test]
    fn asset_reference_from_rest_and_sdk_shapes() {
        let rest: Operation = serde_json::from_value(json!({
            "name": "operations/1",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": "https://files/v1?alt=media", "mimeType": "video/mp4"}}
            ]}}
        }))
        .unwrap();
        assert_eq!(
            rest.asset_reference(),
            Some(AssetReference { uri: "https://files/v1?alt=media".into(), mime_type: Some("video/mp4".into()) })
        );

        let sdk: Operation = serde_json::from_value(json!({
            "name": "operations/2",
            "done": true,
            "response": {"generatedVideos": [{"video": {"uri": "https://files/v2"}}]}
        }))
        .unwrap();
        assert_eq!(sdk.asset_reference().map(|a| a.uri), Some("https://files/v2".to_string()));
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(resp.text(), "Hello, world");
        assert!(resp.first_inline_data().is_none());
    }
}
