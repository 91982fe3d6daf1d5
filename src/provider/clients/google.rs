//! Google Gemini generateContent client.

use crate::error::{GatewayError, Result};
use crate::message::{ChatMessage, Role};
use crate::provider::client::{InvokeOptions, ProviderClient};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

/// Configuration for connecting to the Google Generative Language API.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            base_url: std::env::var("GOOGLE_API_ENDPOINT")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            timeout: None,
        }
    }
}

/// Client for the Gemini generateContent API.
///
/// Gemini names the assistant role `model` and takes the system prompt as a
/// separate `systemInstruction` field; `invoke` performs both translations.
#[derive(Debug)]
pub struct GoogleClient {
    client: Client,
    config: GoogleConfig,
}

impl GoogleClient {
    /// Create a new client with default configuration.
    pub fn new() -> Self {
        Self::with_config(GoogleConfig::default())
    }

    /// Create a new client with custom configuration.
    pub fn with_config(config: GoogleConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().unwrap();

        Self { client, config }
    }

    /// Create a client with a custom API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(GoogleConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Create a client with a custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self::with_config(GoogleConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            ..Default::default()
        })
    }
}

impl Default for GoogleClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for GoogleClient {
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &InvokeOptions,
    ) -> Result<String> {
        info!("Requesting completion from Google");
        debug!("Model: {}, Message count: {}", model, messages.len());

        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{"text": m.content}],
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "temperature": options.temperature,
                "maxOutputTokens": options.max_tokens,
            },
        });
        if !system.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{"text": system.join("\n")}],
            });
        }

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.config.base_url, model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::ProviderError(format!(
                "Google API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;

        let text = response_body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GatewayError::ProviderError(
                "Google response contained no content".to_string(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        std::env::remove_var("GOOGLE_API_KEY");
        std::env::remove_var("GOOGLE_API_ENDPOINT");
        let config = GoogleConfig::default();
        assert_eq!(config.api_key, "");
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_with_api_key_and_base_url() {
        let client = GoogleClient::with_api_key_and_base_url("key", "https://custom.com");
        assert_eq!(client.config.api_key, "key");
        assert_eq!(client.config.base_url, "https://custom.com");
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello!"}]}}]}"#)
            .create();

        let client = GoogleClient::with_api_key_and_base_url("test-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];

        let result = client
            .invoke("gemini-3-flash-preview", &messages, &InvokeOptions::default())
            .await;

        mock.assert();
        assert_eq!(result.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_invoke_translates_roles_and_system_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{
                    "systemInstruction": {"parts": [{"text": "You are terse."}]},
                    "contents": [
                        {"role": "user", "parts": [{"text": "Hi"}]},
                        {"role": "model", "parts": [{"text": "Hello"}]},
                        {"role": "user", "parts": [{"text": "Again"}]}
                    ]
                }"#
                .to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
            .create();

        let client = GoogleClient::with_api_key_and_base_url("test-key", server.url());
        let messages = vec![
            ChatMessage::system("You are terse."),
            ChatMessage::user("Hi"),
            ChatMessage::assistant("Hello"),
            ChatMessage::user("Again"),
        ];

        let result = client
            .invoke("gemini-3-flash-preview", &messages, &InvokeOptions::default())
            .await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invoke_error_carries_remote_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .with_status(400)
            .with_body(r#"{"error":{"message":"API key not valid"}}"#)
            .create();

        let client = GoogleClient::with_api_key_and_base_url("bad-key", server.url());
        let messages = vec![ChatMessage::user("Hi")];

        let result = client
            .invoke("gemini-3-flash-preview", &messages, &InvokeOptions::default())
            .await;

        mock.assert();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("API key not valid"));
    }
}
