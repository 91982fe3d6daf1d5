//! Gateway orchestration: manager, result envelope, and prompt templates.

pub mod manager;
pub mod result;
pub mod templates;

pub use manager::{
    AskAllReport, AskOptions, GatewayManager, GatewayManagerBuilder, ResetReport, SessionHistory,
};
pub use result::{QueryResult, ResponsePayload, ToolCallRequest, ToolExchange};
pub use templates::{
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPLATE, STRUCTURED_TEMPLATE, TOOLS_TEMPLATE,
};
