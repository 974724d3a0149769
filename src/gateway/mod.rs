//! Generation service abstraction and image payload normalization
//!
//! The engine never talks to a provider directly: every external capability
//! goes through [`GenerationService`], so tests swap in a scripted mock and
//! the real gateway client lives behind the same trait.

pub mod client;

pub use client::{GatewayClient, GatewayConfig};

use crate::error::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::warn;

/// One narrative generation call.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub model_id: String,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
}

/// One image generation call.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub model_id: String,
    pub prompt: String,
}

/// Normalized image outcome. Every loosely-shaped gateway payload collapses
/// into exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageResult {
    InlineBytes(Vec<u8>),
    RemoteUrl(String),
    Absent,
}

impl ImageResult {
    /// Render as a displayable reference: a data URL for inline bytes, the
    /// URL itself for remote results.
    pub fn image_ref(&self) -> Option<String> {
        match self {
            ImageResult::InlineBytes(bytes) => {
                Some(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
            }
            ImageResult::RemoteUrl(url) => Some(url.clone()),
            ImageResult::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ImageResult::Absent)
    }
}

/// Opaque remote generation capability.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate narrative text. Returns the raw, possibly messy model output.
    async fn generate_text(&self, req: TextRequest) -> Result<String>;

    /// Generate an image. Failures at the transport level are errors; an
    /// empty-but-successful response is `ImageResult::Absent`.
    async fn generate_image(&self, req: ImageRequest) -> Result<ImageResult>;
}

/// One file entry inside a gateway image response. Providers disagree on
/// which field carries the payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayFile {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "uint8Array")]
    pub bytes: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayStep {
    #[serde(default)]
    pub files: Option<Vec<GatewayFile>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolvedOutput {
    #[serde(default)]
    pub files: Option<Vec<GatewayFile>>,
}

/// Union of the image response shapes observed from the gateway: top-level
/// files, per-step files, a resolved-output container, or the OpenAI-style
/// `data` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagePayload {
    #[serde(default)]
    pub files: Option<Vec<GatewayFile>>,
    #[serde(default)]
    pub steps: Option<Vec<GatewayStep>>,
    #[serde(default, alias = "resolvedOutput")]
    pub resolved_output: Option<ResolvedOutput>,
    #[serde(default)]
    pub data: Option<Vec<GatewayFile>>,
}

fn decode_b64(encoded: &str) -> Option<Vec<u8>> {
    match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("discarding undecodable inline image payload: {e}");
            None
        }
    }
}

fn file_to_result(file: &GatewayFile) -> ImageResult {
    // Field priority mirrors the shapes seen in the wild: encoded bytes
    // first, then raw data, then a remote reference, then a raw byte array.
    if let Some(encoded) = file.b64_json.as_deref().or(file.base64.as_deref()) {
        if let Some(bytes) = decode_b64(encoded) {
            return ImageResult::InlineBytes(bytes);
        }
    }
    if let Some(data) = file.data.as_deref() {
        if let Some(bytes) = decode_b64(data) {
            return ImageResult::InlineBytes(bytes);
        }
    }
    if let Some(url) = file.url.as_deref() {
        if !url.trim().is_empty() {
            return ImageResult::RemoteUrl(url.trim().to_string());
        }
    }
    if let Some(bytes) = file.bytes.as_ref() {
        if !bytes.is_empty() {
            return ImageResult::InlineBytes(bytes.clone());
        }
    }
    ImageResult::Absent
}

/// Collapse every observed payload shape into the first usable image.
pub fn normalize_image_payload(payload: &ImagePayload) -> ImageResult {
    let mut collected: Vec<&GatewayFile> = Vec::new();
    if let Some(files) = payload.files.as_ref() {
        collected.extend(files.iter());
    }
    if let Some(steps) = payload.steps.as_ref() {
        for step in steps {
            if let Some(files) = step.files.as_ref() {
                collected.extend(files.iter());
            }
        }
    }
    if let Some(files) = payload.resolved_output.as_ref().and_then(|r| r.files.as_ref()) {
        collected.extend(files.iter());
    }
    if let Some(files) = payload.data.as_ref() {
        collected.extend(files.iter());
    }

    for file in collected {
        let result = file_to_result(file);
        if !result.is_absent() {
            return result;
        }
    }
    ImageResult::Absent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64_of(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_top_level_files_b64() {
        let payload: ImagePayload = serde_json::from_str(&format!(
            "{{\"files\": [{{\"base64\": \"{}\"}}]}}",
            b64_of(b"png-bytes")
        ))
        .unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::InlineBytes(b"png-bytes".to_vec())
        );
    }

    #[test]
    fn test_nested_step_files() {
        let payload: ImagePayload = serde_json::from_str(&format!(
            "{{\"steps\": [{{}}, {{\"files\": [{{\"data\": \"{}\"}}]}}]}}",
            b64_of(b"step-bytes")
        ))
        .unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::InlineBytes(b"step-bytes".to_vec())
        );
    }

    #[test]
    fn test_resolved_output_container() {
        let payload: ImagePayload = serde_json::from_str(
            "{\"resolvedOutput\": {\"files\": [{\"url\": \"https://img.example/dish.png\"}]}}",
        )
        .unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::RemoteUrl("https://img.example/dish.png".to_string())
        );
    }

    #[test]
    fn test_openai_style_data_array() {
        let payload: ImagePayload = serde_json::from_str(&format!(
            "{{\"data\": [{{\"b64_json\": \"{}\"}}]}}",
            b64_of(b"dalle-bytes")
        ))
        .unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::InlineBytes(b"dalle-bytes".to_vec())
        );
    }

    #[test]
    fn test_raw_byte_array_field() {
        let payload: ImagePayload =
            serde_json::from_str("{\"files\": [{\"uint8Array\": [1, 2, 3]}]}").unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::InlineBytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let payload: ImagePayload = serde_json::from_str("{}").unwrap();
        assert!(normalize_image_payload(&payload).is_absent());
    }

    #[test]
    fn test_undecodable_b64_falls_through_to_url() {
        let payload: ImagePayload = serde_json::from_str(
            "{\"files\": [{\"base64\": \"not base64!!\", \"url\": \"https://img.example/x.png\"}]}",
        )
        .unwrap();
        assert_eq!(
            normalize_image_payload(&payload),
            ImageResult::RemoteUrl("https://img.example/x.png".to_string())
        );
    }

    #[test]
    fn test_image_ref_rendering() {
        let inline = ImageResult::InlineBytes(b"abc".to_vec());
        assert_eq!(
            inline.image_ref().unwrap(),
            format!("data:image/png;base64,{}", STANDARD.encode(b"abc"))
        );
        assert_eq!(
            ImageResult::RemoteUrl("https://x/y.png".into()).image_ref(),
            Some("https://x/y.png".to_string())
        );
        assert_eq!(ImageResult::Absent.image_ref(), None);
    }
}
