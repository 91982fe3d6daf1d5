use std::collections::HashMap;

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolParameter {
    pub name: String,
    /// Human-readable type and purpose, e.g. `string - IANA timezone name`.
    pub description: String,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Static catalog entry describing a tool to the model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    /// Renders the catalog line shown to the model, e.g.
    /// `- get_datetime: Get the current date and time. Params: timezone (string - ...)`.
    pub fn catalog_line(&self) -> String {
        if self.parameters.is_empty() {
            return format!("- {}: {}", self.name, self.description);
        }
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} ({})", p.name, p.description))
            .collect::<Vec<_>>()
            .join(", ");
        format!("- {}: {} Params: {}", self.name, self.description, params)
    }
}

/// Trait for locally executable tools.
///
/// Execution is synchronous, local, and expected to finish quickly. A tool
/// never fails out-of-band: problems are reported as an `Error: ...` string
/// so the model's next turn always consumes plain text.
pub trait Tool: Send + Sync {
    /// Get the catalog entry for this tool
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given arguments
    fn run(&self, args: &HashMap<String, String>) -> String;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.definition().name == name
    }
}
