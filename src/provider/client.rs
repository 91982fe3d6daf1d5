use crate::error::Result;
use crate::message::ChatMessage;
use async_trait::async_trait;

/// Per-invocation sampling parameters.
///
/// Defaults mirror the gateway-wide request defaults: temperature 0.7 and a
/// 1000-token budget.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOptions {
    /// Sampling temperature, expected in `[0, 2]`.
    pub temperature: f32,
    /// Maximum number of tokens the provider may generate.
    pub max_tokens: u32,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Uniform interface to a remote LLM backend.
///
/// An implementation wraps exactly one outbound network call per `invoke`:
/// no retries, no caching. Any transport, authentication, rate-limit, or
/// malformed-payload failure surfaces as a
/// [`ProviderError`](crate::error::GatewayError::ProviderError) carrying the
/// remote error text, and the caller treats it as terminal for that call.
///
/// # Examples
///
/// ```ignore
/// use omnigate::provider::{InvokeOptions, ProviderClient};
/// use omnigate::provider::clients::OpenAiClient;
/// use omnigate::message::ChatMessage;
///
/// let client = OpenAiClient::new();
/// let messages = vec![ChatMessage::user("Say hello")];
/// let text = client.invoke("gpt-5-mini", &messages, &InvokeOptions::default()).await?;
/// ```
#[async_trait]
pub trait ProviderClient: Send + Sync + std::fmt::Debug {
    /// Sends the ordered message list to the remote model and returns its
    /// raw text answer.
    async fn invoke(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &InvokeOptions,
    ) -> Result<String>;
}
