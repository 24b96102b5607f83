//! Structured error types for the Folio report engine.
//!
//! Only malformed top-level input aborts a render. Everything the engine can
//! recover from (unknown aggregate functions, non-numeric values, oversized
//! parts, missing parts) is logged and rendered through instead.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input (payload or schema) failed to parse.
    #[error("Failed to parse input: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// The payload is missing the column manifest or the row data.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the expected shape. Check field names and types."
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse input"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn truncated_input_is_classified_as_eof() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{ \"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn malformed_payload_message() {
        let err = FolioError::MalformedPayload("missing 'bodyData'".to_string());
        assert_eq!(err.to_string(), "Malformed payload: missing 'bodyData'");
    }
}
