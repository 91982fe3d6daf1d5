//! Anthropic messages-API client.

use crate::error::{GatewayError, Result};
use crate::message::{ChatMessage, Role};
use crate::provider::client::{InvokeOptions, ProviderClient};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for connecting to the Anthropic API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: std::env::var("ANTHROPIC_API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            timeout: None,
        }
    }
}

/// Client for the Anthropic messages API.
///
/// The messages endpoint takes the system prompt as a top-level field rather
/// than a message role, so `invoke` splits system turns out of the list
/// before building the request body.
#[derive(Debug)]
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a new client with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnthropicConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(config: AnthropicConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().unwrap();

        Self { client, config }
    }

    /// Create a client with a custom API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(AnthropicConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Create a client with a custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_config(AnthropicConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }
}

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for AnthropicClient {
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &InvokeOptions,
    ) -> Result<String> {
        info!("Requesting completion from Anthropic");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let chat: Vec<&ChatMessage> =
            messages.iter().filter(|m| m.role != Role::System).collect();

        let mut body = serde_json::json!({
            "model": model,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature,
            "messages": chat,
        });
        if !system.is_empty() {
            body["system"] = Value::String(system.join("\n"));
        }

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderError(format!(
                "Anthropic API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        let text = response_body["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::ProviderError(
                "Anthropic response contained no content".to_string(),
            ));
        }

        Ok(text)
    }
}
