//! Custom error types for scholarsearch.
//!
//! All library functions return `Result<T, ScholarSearchError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for scholarsearch operations.
#[derive(Debug, Error)]
pub enum ScholarSearchError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be normalized
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limited by the publication service
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Publication service returned an error status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// `detail` field of the error body, or the status text
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Author list import error
    #[error("Import error: {0}")]
    Import(String),

    /// Document generation error
    #[error("Export error: {0}")]
    Export(String),
}

/// Result type alias using `ScholarSearchError`
pub type Result<T> = std::result::Result<T, ScholarSearchError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ScholarSearchError::Parse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_or_parse() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_parse("no value");
        assert!(matches!(err, Err(ScholarSearchError::Parse(ref m)) if m == "no value"));
        assert_eq!(Some(3).ok_or_parse("unused").ok(), Some(3));
    }

    #[test]
    fn test_api_error_display() {
        let err = ScholarSearchError::Api {
            code: 403,
            message: "Invalid API key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 403 - Invalid API key");
    }
}
