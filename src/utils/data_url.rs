//! `data:` URI encoding and decoding for inline image payloads.
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{AppError, AppResult};

const FALLBACK_MIME: &str = "application/octet-stream";

/// Bytes materialized from an inline resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InlineData {
    /// File name to attach to multipart uploads, derived from the MIME subtype.
    pub fn file_name(&self, stem: &str) -> String {
        let ext = match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/svg+xml" => "svg",
            other => other
                .strip_prefix("image/")
                .or_else(|| other.strip_prefix("video/"))
                .filter(|s| !s.is_empty())
                .unwrap_or("bin"),
        };
        format!("{}.{}", stem, ext)
    }
}

pub fn is_data_url(value: &str) -> bool {
    value.trim_start().starts_with("data:")
}

/// Decode `data:[<mime>][;base64],<payload>`.
///
/// Payloads without the `;base64` marker are taken verbatim.
pub fn decode(value: &str) -> AppResult<InlineData> {
    let rest = value
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Validation("image URL is not a data URL".to_string()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::Validation("invalid data URL: missing ','".to_string()))?;

    let mut params = meta.split(';').map(str::trim);
    let mime_type = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(FALLBACK_MIME)
        .to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|e| AppError::Validation(format!("invalid data URL payload: {}", e)))?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(InlineData { mime_type, bytes })
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Guess an image MIME type from a file extension.
pub fn mime_from_extension(path: &std::path::Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        _ => FALLBACK_MIME,
    }
}
