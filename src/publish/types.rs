use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::lenient::{null_as_default, required_string_or_number, string_or_number};

/// A post to create on a target feed or page.
///
/// Only the first entry of `image_urls` is ever published; further entries
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_urls: Vec<String>,
}

impl PublishRequest {
    pub fn new(target_id: impl Into<String>, message: impl Into<String>) -> Self {
        PublishRequest { target_id: target_id.into(), message: message.into(), image_urls: Vec::new() }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_urls.push(url.into());
        self
    }
}

/// Normalized success shape of both publish paths.
///
/// `extra` carries any other fields of a text post's upstream response, so
/// that body round-trips verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    #[serde(deserialize_with = "required_string_or_number")]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PublishResult {
    pub fn new(id: impl Into<String>) -> Self {
        PublishResult { id: id.into(), extra: Map::new() }
    }
}

/// Upstream answer of the photo endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct PhotoResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub post_id: Option<String>,
}

impl PhotoResponse {
    /// `post_id` wins over the photo's own `id`.
    pub fn into_result(self) -> Option<PublishResult> {
        self.post_id.or(self.id).filter(|id| !id.is_empty()).map(PublishResult::new)
    }
}
