//! Error types and result aliases for the omnigate library.
//!
//! This module defines the core error type [`GatewayError`] and the [`Result`] type alias
//! used throughout the library. All public APIs that can fail return `Result<T>` for
//! consistent error handling. Note that [`GatewayManager::ask`](crate::gateway::GatewayManager::ask)
//! deliberately does *not* return `Result` — every failure is folded into the
//! returned [`QueryResult`](crate::gateway::QueryResult) so transports have one
//! uniform shape to branch on.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("LLM provider error: {0}")]
    ProviderError(String),

    #[error("Structured decode error: {reason}")]
    DecodeError { reason: String, raw: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Memory store error: {0}")]
    MemoryError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GatewayError {
    /// Creates a decode error carrying the undecodable model text.
    ///
    /// The raw text is kept alongside the reason so callers can surface it
    /// for diagnosis without re-reading the wire.
    pub fn decode(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        GatewayError::DecodeError {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display() {
        let err = GatewayError::ProviderError("connection refused".to_string());
        assert_eq!(err.to_string(), "LLM provider error: connection refused");
    }

    #[test]
    fn test_decode_error_display() {
        let err = GatewayError::decode("no JSON object found", "plain prose");
        assert_eq!(err.to_string(), "Structured decode error: no JSON object found");
    }

    #[test]
    fn test_decode_error_keeps_raw_text() {
        let err = GatewayError::decode("expected value", "not { json");
        match err {
            GatewayError::DecodeError { raw, .. } => assert_eq!(raw, "not { json"),
            _ => panic!("Expected DecodeError"),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = GatewayError::ConfigError("missing API key".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: missing API key");
    }

    #[test]
    fn test_memory_error_display() {
        let err = GatewayError::MemoryError("malformed history line".to_string());
        assert_eq!(err.to_string(), "Memory store error: malformed history line");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GatewayError = json_err.into();

        match err {
            GatewayError::SerializationError(_) => {}
            _ => panic!("Expected SerializationError"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatewayError = io_err.into();

        match err {
            GatewayError::IoError(_) => {}
            _ => panic!("Expected IoError"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = GatewayError::ProviderError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ProviderError"));
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(GatewayError::ConfigError("test".to_string()));
        assert!(err_result.is_err());
    }
}
