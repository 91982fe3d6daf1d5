pub mod anthropic;
pub mod google;
pub mod openai;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use google::{GoogleClient, GoogleConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
