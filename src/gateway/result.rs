//! Result envelope returned by every gateway query.
//!
//! Failures travel in-band: a query that cannot be served still produces a
//! [`QueryResult`], with `success` false and the reason in `error`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// A tool invocation requested by the model during the tool protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: HashMap<String, String>,
}

/// The complete record of a tool exchange: what was called, what it
/// returned, and the model's final answer.
///
/// `tool_call` and `tool_output` are both `None` when the model answered
/// directly without calling a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExchange {
    pub tool_call: Option<ToolCallRequest>,
    pub tool_output: Option<String>,
    pub final_answer: String,
}

/// The payload of a successful query, shaped by the gateway's capabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// Plain text mode: the provider's response verbatim.
    Text(String),
    /// Structured mode: the decoded JSON object.
    Structured(Value),
    /// Tool mode: the full exchange record.
    Tool(ToolExchange),
}

/// One step of the tool protocol, decoded from the model's JSON reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolStep {
    pub tool_call: Option<ToolCallRequest>,
    pub final_answer: String,
}

impl ToolStep {
    /// Reads a protocol step out of a decoded JSON value.
    ///
    /// `tool_call` must be `null`, absent, or an object with a non-empty
    /// `name`; anything else is a decode failure. `raw` is the original
    /// model text, preserved in the error for diagnostics.
    pub fn parse(value: &Value, raw: &str) -> Result<ToolStep> {
        let object = value.as_object().ok_or_else(|| {
            GatewayError::decode("expected an object with tool_call and final_answer", raw)
        })?;
        let final_answer = object
            .get("final_answer")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let tool_call = match object.get("tool_call") {
            None | Some(Value::Null) => None,
            Some(Value::Object(call)) => {
                let name = call.get("name").and_then(Value::as_str).unwrap_or("");
                if name.is_empty() {
                    return Err(GatewayError::decode("tool_call is missing a name", raw));
                }
                let arguments = match call.get("arguments") {
                    None | Some(Value::Null) => HashMap::new(),
                    Some(Value::Object(args)) => args
                        .iter()
                        .map(|(key, value)| (key.clone(), argument_text(value)))
                        .collect(),
                    Some(_) => {
                        return Err(GatewayError::decode(
                            "tool_call arguments must be an object",
                            raw,
                        ));
                    }
                };
                Some(ToolCallRequest { name: name.to_string(), arguments })
            }
            Some(_) => {
                return Err(GatewayError::decode("tool_call must be an object or null", raw));
            }
        };
        Ok(ToolStep { tool_call, final_answer })
    }
}

/// Coerces a tool argument to text; non-string values keep their JSON form.
fn argument_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

/// The uniform envelope for one query against one provider.
///
/// `success` is authoritative: when true, `response` is present and `error`
/// is absent; when false, `error` is present and `response` is absent. On a
/// structured decode failure `raw` carries the undecodable model text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub success: bool,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponsePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub session_id: String,
}

impl QueryResult {
    /// Sentinel used for `provider` and `model` when no provider served the
    /// query.
    pub const NONE: &'static str = "none";

    pub fn is_text(&self) -> bool {
        matches!(self.response, Some(ResponsePayload::Text(_)))
    }

    /// The final answer text, whatever shape the payload took. `None` for
    /// failed queries and for structured payloads with no text field.
    pub fn answer_text(&self) -> Option<&str> {
        match &self.response {
            Some(ResponsePayload::Text(text)) => Some(text),
            Some(ResponsePayload::Tool(exchange)) => Some(&exchange.final_answer),
            Some(ResponsePayload::Structured(value)) => {
                value.get("answer").and_then(Value::as_str)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_step_null_call() {
        let value = json!({"tool_call": null, "final_answer": "Paris"});
        let step = ToolStep::parse(&value, "raw").unwrap();
        assert!(step.tool_call.is_none());
        assert_eq!(step.final_answer, "Paris");
    }

    #[test]
    fn test_tool_step_absent_call_and_answer() {
        let step = ToolStep::parse(&json!({}), "raw").unwrap();
        assert!(step.tool_call.is_none());
        assert_eq!(step.final_answer, "");
    }

    #[test]
    fn test_tool_step_with_call() {
        let value = json!({
            "tool_call": {"name": "get_datetime", "arguments": {"timezone": "UTC"}},
            "final_answer": ""
        });
        let step = ToolStep::parse(&value, "raw").unwrap();
        let call = step.tool_call.unwrap();
        assert_eq!(call.name, "get_datetime");
        assert_eq!(call.arguments.get("timezone").unwrap(), "UTC");
    }

    #[test]
    fn test_tool_step_coerces_non_string_arguments() {
        let value = json!({
            "tool_call": {"name": "lookup", "arguments": {"count": 3, "deep": true}},
            "final_answer": ""
        });
        let step = ToolStep::parse(&value, "raw").unwrap();
        let call = step.tool_call.unwrap();
        assert_eq!(call.arguments.get("count").unwrap(), "3");
        assert_eq!(call.arguments.get("deep").unwrap(), "true");
    }

    #[test]
    fn test_tool_step_rejects_non_object_call() {
        let value = json!({"tool_call": "get_datetime", "final_answer": ""});
        let err = ToolStep::parse(&value, "the raw text").unwrap_err();
        match err {
            GatewayError::DecodeError { raw, .. } => assert_eq!(raw, "the raw text"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tool_step_rejects_nameless_call() {
        let value = json!({"tool_call": {"arguments": {}}, "final_answer": ""});
        assert!(ToolStep::parse(&value, "raw").is_err());
    }

    #[test]
    fn test_tool_step_rejects_non_object_value() {
        assert!(ToolStep::parse(&json!("just a string"), "raw").is_err());
        assert!(ToolStep::parse(&json!([1, 2]), "raw").is_err());
    }

    #[test]
    fn test_tool_exchange_serializes_nulls() {
        let exchange = ToolExchange {
            tool_call: None,
            tool_output: None,
            final_answer: "done".to_string(),
        };
        let json = serde_json::to_value(&exchange).unwrap();
        assert_eq!(
            json,
            json!({"tool_call": null, "tool_output": null, "final_answer": "done"})
        );
    }

    #[test]
    fn test_payload_serialization_is_untagged() {
        let text = serde_json::to_value(ResponsePayload::Text("hi".to_string())).unwrap();
        assert_eq!(text, json!("hi"));

        let structured =
            serde_json::to_value(ResponsePayload::Structured(json!({"answer": "42"}))).unwrap();
        assert_eq!(structured, json!({"answer": "42"}));
    }

    #[test]
    fn test_query_result_skips_absent_fields() {
        let result = QueryResult {
            success: true,
            provider: "openai".to_string(),
            model: "gpt-5-mini".to_string(),
            prompt: "hi".to_string(),
            response: Some(ResponsePayload::Text("hello".to_string())),
            error: None,
            raw: None,
            temperature: 0.7,
            max_tokens: 1000,
            session_id: "default".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("raw").is_none());
        assert_eq!(json["response"], json!("hello"));
    }

    #[test]
    fn test_answer_text_per_payload() {
        let text = ResponsePayload::Text("plain".to_string());
        let structured = ResponsePayload::Structured(json!({"answer": "structured"}));
        let tool = ResponsePayload::Tool(ToolExchange {
            tool_call: None,
            tool_output: None,
            final_answer: "via tool".to_string(),
        });
        let mut result = QueryResult {
            success: true,
            provider: "openai".to_string(),
            model: "gpt-5-mini".to_string(),
            prompt: "p".to_string(),
            response: Some(text),
            error: None,
            raw: None,
            temperature: 0.7,
            max_tokens: 1000,
            session_id: "default".to_string(),
        };
        assert_eq!(result.answer_text(), Some("plain"));
        result.response = Some(structured);
        assert_eq!(result.answer_text(), Some("structured"));
        result.response = Some(tool);
        assert_eq!(result.answer_text(), Some("via tool"));
        result.response = None;
        assert_eq!(result.answer_text(), None);
    }
}
