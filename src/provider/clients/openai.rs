//! OpenAI-compatible chat-completions client.
//!
//! Serves the openai provider directly and, via a base-URL override, any
//! endpoint speaking the same protocol — the xai Grok API in the default
//! catalog.

use crate::error::{GatewayError, Result};
use crate::message::ChatMessage;
use crate::provider::client::{InvokeOptions, ProviderClient};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

/// Configuration for connecting to an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            timeout: None,
        }
    }
}

/// Client for OpenAI-compatible chat-completions endpoints.
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client with default configuration.
    pub fn new() -> Self {
        Self::with_config(OpenAiConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(config: OpenAiConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().unwrap();

        Self { client, config }
    }

    /// Create a client with a custom API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAiConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Create a client with a custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_config(OpenAiConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for OpenAiClient {
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &InvokeOptions,
    ) -> Result<String> {
        info!("Requesting chat completion from OpenAI-compatible endpoint");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderError(format!(
                "OpenAI API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        response_body["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                GatewayError::ProviderError("OpenAI response contained no content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_resolution() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_API_ENDPOINT");
        let config = OpenAiConfig::default();
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert!(config.timeout.is_none());

        std::env::set_var("OPENAI_API_KEY", "test-key");
        std::env::set_var("OPENAI_API_ENDPOINT", "https://custom.openai.com");
        let config = OpenAiConfig::default();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://custom.openai.com");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("OPENAI_API_ENDPOINT");
    }

    #[test]
    fn test_with_api_key_and_base_url() {
        let client = OpenAiClient::with_api_key_and_base_url("key", "https://custom.com");
        assert_eq!(client.config.api_key, "key");
        assert_eq!(client.config.base_url, "https://custom.com");
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Hello!"}}]}"#)
            .create();

        let client = OpenAiClient::with_api_key_and_base_url("test-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];

        let result = client.invoke("gpt-5-mini", &messages, &InvokeOptions::default()).await;

        mock.assert();
        assert_eq!(result.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_invoke_sends_sampling_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"gpt-5-mini","temperature":0.2,"max_tokens":50}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create();

        let client = OpenAiClient::with_api_key_and_base_url("test-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];
        let options = InvokeOptions {
            temperature: 0.2,
            max_tokens: 50,
        };

        let result = client.invoke("gpt-5-mini", &messages, &options).await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invoke_error_carries_remote_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("Unauthorized")
            .create();

        let client = OpenAiClient::with_api_key_and_base_url("bad-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];

        let result = client.invoke("gpt-5-mini", &messages, &InvokeOptions::default()).await;

        mock.assert();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_invoke_without_content_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create();

        let client = OpenAiClient::with_api_key_and_base_url("test-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];

        let result = client.invoke("gpt-5-mini", &messages, &InvokeOptions::default()).await;

        mock.assert();
        assert!(matches!(result, Err(GatewayError::ProviderError(_))));
    }
}
