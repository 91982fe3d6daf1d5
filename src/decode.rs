//! Tolerant decoding of structured model output.
//!
//! Models reliably wrap JSON in formatting nobody asked for — usually a
//! fenced code block, sometimes surrounding prose. A strict parser would
//! fail too often to be usable, so decoding is two-tier: strip an enclosing
//! code fence and try a direct parse, then fall back to the first balanced
//! `{...}` span in the text. If that span turns out to be some unrelated
//! object embedded in earlier prose, it still wins; that is a known limit of
//! the extraction, not something this module second-guesses.
//!
//! Decoding never mutates its input and performs no I/O.

use crate::error::{GatewayError, Result};
use serde_json::Value;

/// Removes an enclosing markdown code fence, if present.
///
/// Handles a leading ```` ```json ```` or bare ```` ``` ```` marker and a
/// trailing ```` ``` ```` marker, trimming whitespace as it goes. Text
/// without fences passes through untouched (minus outer whitespace).
pub fn strip_code_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest.trim_start();
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest.trim_start();
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim_end();
    }
    cleaned
}

/// Finds the first balanced `{...}` span, tracking brace depth while
/// skipping string literals and their escapes. Returns `None` when no span
/// closes.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes model text into a JSON value.
///
/// Tier one: strip an enclosing code fence and parse directly. Tier two: on
/// failure, parse the first balanced `{...}` span. Any remaining failure
/// becomes a [`DecodeError`](GatewayError::DecodeError) carrying the
/// original raw text for diagnosis.
pub fn decode_structured(raw: &str) -> Result<Value> {
    let cleaned = strip_code_fence(raw);

    let direct = serde_json::from_str::<Value>(cleaned);
    let direct_err = match direct {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if let Some(span) = first_json_object(cleaned) {
        return serde_json::from_str::<Value>(span)
            .map_err(|err| GatewayError::decode(err.to_string(), raw));
    }

    Err(GatewayError::decode(direct_err.to_string(), raw))
}
