//! HTTP client for the AI gateway
//!
//! Speaks the gateway's OpenAI-compatible surface: `chat/completions` for
//! narrative text and `images/generations` for dish images and portraits.
//! No retry or backoff is applied; a failed call is the caller's problem to
//! degrade from.

use crate::error::{Error, Result};
use crate::gateway::{
    normalize_image_payload, GenerationService, ImagePayload, ImageRequest, ImageResult,
    TextRequest,
};
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://ai-gateway.vercel.sh/v1".to_string(),
            timeout_secs: 120,
            rate_limit: RateLimiter::DEFAULT_LIMIT,
            rate_window: RateLimiter::DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize)]
struct ImageGenRequest {
    model: String,
    prompt: String,
    n: u8,
    size: &'static str,
    response_format: &'static str,
}

/// Gateway-backed implementation of [`GenerationService`].
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
    limiter: Mutex<RateLimiter>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config(
                "Missing AI gateway API key. Set AI_GATEWAY_API_KEY or pass --api-key.".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        let limiter = Mutex::new(RateLimiter::new(config.rate_limit, config.rate_window));
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    fn check_rate(&self, model_id: &str) -> Result<()> {
        let decision = self
            .limiter
            .lock()
            .map_err(|_| Error::Other("rate limiter lock poisoned".to_string()))?
            .check(model_id);
        if decision.allowed {
            Ok(())
        } else {
            Err(Error::RateLimited(format!(
                "too many calls for model {model_id} in the current window"
            )))
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl GenerationService for GatewayClient {
    async fn generate_text(&self, req: TextRequest) -> Result<String> {
        self.check_rate(&req.model_id)?;
        debug!(model = %req.model_id, "gateway text call");

        let mut messages = Vec::new();
        if let Some(system) = req.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: req.prompt,
        });

        let body = ChatRequest {
            model: req.model_id,
            messages,
            temperature: req.temperature,
        };

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let parsed: ChatResponse = response.json().await?;
                let content = parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .unwrap_or_default();
                Ok(content)
            }
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited(
                "gateway rejected the call: rate limit exceeded".to_string(),
            )),
            StatusCode::UNAUTHORIZED => {
                Err(Error::Config("Invalid gateway API key".to_string()))
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(Error::Gateway(format!("text generation failed ({status}): {text}")))
            }
        }
    }

    async fn generate_image(&self, req: ImageRequest) -> Result<ImageResult> {
        self.check_rate(&req.model_id)?;
        debug!(model = %req.model_id, "gateway image call");

        let body = ImageGenRequest {
            model: req.model_id,
            prompt: req.prompt,
            n: 1,
            size: "1024x1024",
            response_format: "b64_json",
        };

        let response = self
            .http
            .post(self.endpoint("images/generations"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let payload: ImagePayload = response.json().await?;
                Ok(normalize_image_payload(&payload))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited(
                "gateway rejected the call: rate limit exceeded".to_string(),
            )),
            StatusCode::UNAUTHORIZED => {
                Err(Error::Config("Invalid gateway API key".to_string()))
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(Error::Gateway(format!("image generation failed ({status}): {text}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = GatewayConfig::default();
        assert!(matches!(GatewayClient::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_endpoint_join_handles_trailing_slash() {
        let config = GatewayConfig {
            api_key: "k".to_string(),
            base_url: "https://gw.example/v1/".to_string(),
            ..GatewayConfig::default()
        };
        let client = GatewayClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("chat/completions"),
            "https://gw.example/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_client_side_rate_limit_denies() {
        let config = GatewayConfig {
            api_key: "k".to_string(),
            rate_limit: 1,
            ..GatewayConfig::default()
        };
        let client = GatewayClient::new(config).unwrap();
        assert!(client.check_rate("model-x").is_ok());
        assert!(matches!(
            client.check_rate("model-x"),
            Err(Error::RateLimited(_))
        ));
    }
}
