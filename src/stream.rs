//! Helpers for delivering responses as chunk streams.
//!
//! Transports that drip a response out SSE-style share three steps:
//! collapse the payload to displayable text, split the text into small
//! chunks, and yield the chunks with an optional pacing delay. The helpers
//! here do exactly that and nothing transport-specific.

use std::pin::Pin;
use std::time::Duration;

use futures::stream::Stream;
use serde_json::Value;

use crate::gateway::ResponsePayload;

/// Chunk size used by transports that do not pick their own.
pub const DEFAULT_CHUNK_SIZE: usize = 28;

/// Collapses a response payload to displayable text.
///
/// Structured payloads prefer `answer`, then `final_answer`, then
/// `distilled`, then `summary`, skipping empty fields; with none present
/// the serialized object is returned. Tool payloads use the final answer
/// and plain text passes through.
pub fn normalize_response_text(payload: &ResponsePayload) -> String {
    match payload {
        ResponsePayload::Text(text) => text.clone(),
        ResponsePayload::Tool(exchange) => exchange.final_answer.clone(),
        ResponsePayload::Structured(value) => structured_text(value),
    }
}

fn structured_text(value: &Value) -> String {
    for field in ["answer", "final_answer", "distilled", "summary"] {
        let text = value.get(field).and_then(Value::as_str).unwrap_or("");
        if !text.is_empty() {
            return text.to_string();
        }
    }
    value.to_string()
}

/// Splits text into chunks of at most `size` characters.
///
/// Splitting counts characters, not bytes, so multi-byte text never breaks
/// mid-character. Empty text, or a zero size, yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if text.is_empty() || size == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Streams text as chunks, pausing `delay` before each chunk.
pub fn text_chunk_stream(
    text: &str,
    size: usize,
    delay: Option<Duration>,
) -> Pin<Box<dyn Stream<Item = String> + Send>> {
    let chunks = chunk_text(text, size);
    Box::pin(async_stream::stream! {
        for chunk in chunks {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            yield chunk;
        }
    })
}
