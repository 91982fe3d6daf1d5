use crate::tools::tool::{Tool, ToolDefinition};
use crate::tools::{DatetimeTool, MarkdownTool};
use std::collections::HashMap;
use tracing::debug;

/// Catalog of locally executable tools.
///
/// Lookup is by exact name. Running an unknown name returns a descriptive
/// `Unknown action: ...` string instead of failing, so the model's
/// downstream consumption of tool output is always a plain string.
///
/// # Examples
///
/// ```ignore
/// use omnigate::tools::ToolRegistry;
/// use std::collections::HashMap;
///
/// let registry = ToolRegistry::with_defaults();
/// let mut args = HashMap::new();
/// args.insert("timezone".to_string(), "UTC".to_string());
/// let now = registry.run("get_datetime", &args);
/// ```
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the shipped utility tools.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DatetimeTool));
        registry.register(Box::new(MarkdownTool));
        registry
    }

    /// Adds a tool to the catalog.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Catalog entries in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Renders the tool catalog shown to the model, one line per tool.
    pub fn catalog_prompt(&self) -> String {
        self.tools
            .iter()
            .map(|tool| tool.definition().catalog_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Executes the named tool, or reports an unknown action as text.
    pub fn run(&self, name: &str, arguments: &HashMap<String, String>) -> String {
        match self.tools.iter().find(|tool| tool.matches(name)) {
            Some(tool) => {
                debug!("Running tool: {}", name);
                tool.run(arguments)
            }
            None => format!("Unknown action: {}", name),
        }
    }
}
