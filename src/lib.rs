pub mod decode;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod message;
pub mod provider;
pub mod stream;
pub mod tools;

pub use error::{GatewayError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{GatewayError, Result};
    pub use crate::gateway::{AskOptions, GatewayManager, QueryResult, ResponsePayload};
    pub use crate::memory::{FileMemoryStore, InMemoryStore, MemoryStore, SessionKey};
    pub use crate::message::{ChatMessage, Role};
    pub use crate::provider::{ProviderClient, ProviderId, ProviderRegistry};
    pub use crate::tools::{Tool, ToolRegistry};
}
