pub mod datetime;
pub mod markdown;
mod registry;
mod tool;

pub use datetime::DatetimeTool;
pub use markdown::MarkdownTool;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDefinition, ToolParameter};
