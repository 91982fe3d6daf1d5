//! Prompt templates used by the gateway.
//!
//! Substitution is plain marker replacement, not a format language: only
//! the named `{...}` markers are touched, so templates may freely contain
//! literal JSON braces.

/// Default request template: the topic passes through unchanged.
pub const DEFAULT_TEMPLATE: &str = "{topic}";

/// System prompt prepended to every wire call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Ready-made template for structured mode, asking for a fixed JSON shape.
pub const STRUCTURED_TEMPLATE: &str = "Answer the question below about {topic}.\n\
Respond ONLY with a valid JSON object, no code fences, in this shape:\n\
{\"answer\": \"the full answer\", \"summary\": \"one short paragraph\", \
\"keywords\": [\"keyword\", ...], \"distilled\": \"the answer in 140 characters or less\"}";

/// First step of the tool protocol: topic plus tool catalog, requiring the
/// `{tool_call, final_answer}` shape back.
pub const TOOLS_TEMPLATE: &str = "You can call ONE local tool before answering, if it helps.\n\
Available tools:\n\
{tools}\n\
\n\
User question: {topic}\n\
\n\
Respond ONLY with a valid JSON object in this shape:\n\
{\"tool_call\": {\"name\": \"tool name\", \"arguments\": {\"param\": \"value\"}} or null, \
\"final_answer\": \"your answer\"}\n\
If no tool is needed, set \"tool_call\" to null and answer directly in \"final_answer\".";

/// Second step of the tool protocol: original topic, the tool call made,
/// and its output, requiring a final answer with no further tool call.
pub const FOLLOW_UP_TEMPLATE: &str = "You called a tool while answering this question: {topic}\n\
Tool call: {tool_call}\n\
Tool output: {tool_output}\n\
\n\
Now give the final answer. Respond ONLY with a valid JSON object in this shape:\n\
{\"tool_call\": null, \"final_answer\": \"your answer\"}";

/// Substitutes the topic into a caller-supplied template.
pub fn render_topic(template: &str, topic: &str) -> String {
    template.replace("{topic}", topic)
}

/// Builds the first tool-protocol prompt from the catalog and the rendered
/// user prompt.
pub fn render_tools_prompt(catalog: &str, topic: &str) -> String {
    TOOLS_TEMPLATE.replace("{tools}", catalog).replace("{topic}", topic)
}

/// Builds the second tool-protocol prompt.
pub fn render_follow_up(topic: &str, tool_call: &str, tool_output: &str) -> String {
    FOLLOW_UP_TEMPLATE
        .replace("{topic}", topic)
        .replace("{tool_call}", tool_call)
        .replace("{tool_output}", tool_output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_topic() {
        assert_eq!(render_topic("Tell me about {topic}.", "Rust"), "Tell me about Rust.");
        assert_eq!(render_topic(DEFAULT_TEMPLATE, "weather"), "weather");
    }

    #[test]
    fn test_render_topic_leaves_other_braces_alone() {
        let rendered = render_topic(STRUCTURED_TEMPLATE, "tea");
        assert!(rendered.contains("Answer the question below about tea."));
        assert!(rendered.contains("{\"answer\":"));
        assert!(!rendered.contains("{topic}"));
    }

    #[test]
    fn test_render_tools_prompt() {
        let rendered = render_tools_prompt("- get_datetime: Now. Params: timezone (string)", "time?");
        assert!(rendered.contains("- get_datetime: Now."));
        assert!(rendered.contains("User question: time?"));
        assert!(!rendered.contains("{tools}"));
    }

    #[test]
    fn test_render_follow_up() {
        let rendered = render_follow_up("time?", r#"{"name":"get_datetime"}"#, "2025-01-01");
        assert!(rendered.contains("question: time?"));
        assert!(rendered.contains(r#"Tool call: {"name":"get_datetime"}"#));
        assert!(rendered.contains("Tool output: 2025-01-01"));
    }
}
