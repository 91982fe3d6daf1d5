use crate::tools::tool::{Tool, ToolDefinition, ToolParameter};
use chrono::{FixedOffset, Local, Utc};
use std::collections::HashMap;

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Tool reporting the current date and time.
///
/// The `timezone` argument accepts `UTC` (the default), `local`, or a fixed
/// offset like `+05:30`. Anything else produces an `Error: ...` string so
/// the model can react to it in its follow-up turn.
///
/// # Examples
///
/// ```ignore
/// use omnigate::tools::{DatetimeTool, Tool};
/// use std::collections::HashMap;
///
/// let tool = DatetimeTool;
/// let now = tool.run(&HashMap::new());
/// // e.g. "2025-07-04 16:20:00 UTC"
/// ```
pub struct DatetimeTool;

impl Tool for DatetimeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_datetime".to_string(),
            description: "Get the current date and time for a given timezone.".to_string(),
            parameters: vec![ToolParameter::new(
                "timezone",
                "string - UTC, local, or a fixed offset like +05:30",
            )],
        }
    }

    fn run(&self, args: &HashMap<String, String>) -> String {
        let timezone = args.get("timezone").map(String::as_str).unwrap_or("UTC");

        if timezone.eq_ignore_ascii_case("utc") {
            return Utc::now().format(OUTPUT_FORMAT).to_string();
        }
        if timezone.eq_ignore_ascii_case("local") {
            return Local::now().format(OUTPUT_FORMAT).to_string();
        }
        match timezone.parse::<FixedOffset>() {
            Ok(offset) => Utc::now().with_timezone(&offset).format(OUTPUT_FORMAT).to_string(),
            Err(_) => format!("Error: unknown timezone {:?}", timezone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition() {
        let definition = DatetimeTool.definition();
        assert_eq!(definition.name, "get_datetime");
        assert!(definition.description.contains("current date and time"));
        assert_eq!(definition.parameters.len(), 1);
        assert_eq!(definition.parameters[0].name, "timezone");
    }

    #[test]
    fn test_run_defaults_to_utc() {
        let output = DatetimeTool.run(&HashMap::new());
        let re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} UTC$").unwrap();
        assert!(re.is_match(&output), "unexpected output: {output}");
    }

    #[test]
    fn test_run_with_fixed_offset() {
        let mut args = HashMap::new();
        args.insert("timezone".to_string(), "+05:30".to_string());

        let output = DatetimeTool.run(&args);
        let re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \+05:30$").unwrap();
        assert!(re.is_match(&output), "unexpected output: {output}");
    }

    #[test]
    fn test_run_with_local_timezone() {
        let mut args = HashMap::new();
        args.insert("timezone".to_string(), "local".to_string());

        let output = DatetimeTool.run(&args);
        let re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} ").unwrap();
        assert!(re.is_match(&output), "unexpected output: {output}");
    }

    #[test]
    fn test_run_with_unknown_timezone_reports_error_text() {
        let mut args = HashMap::new();
        args.insert("timezone".to_string(), "Atlantis/Lost".to_string());

        let output = DatetimeTool.run(&args);
        assert_eq!(output, "Error: unknown timezone \"Atlantis/Lost\"");
    }
}
