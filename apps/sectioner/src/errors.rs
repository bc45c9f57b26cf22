use serde_json::{json, Value};
use thiserror::Error;

/// Engine-level error type.
///
/// Classification and usage analysis never fail on well-typed input: a
/// section with no category is reported as uncertain and an item with no
/// evidence gets an empty `UsageResult`. Only construction-time problems
/// surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Semantic model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid record: start year {start} is after end year {end}")]
    InvalidRecord { start: i32, end: i32 },

    #[error("Invalid record: year {0} is outside 1..=9999")]
    YearOutOfRange(i32),

    #[error("Failed to load tables: {0}")]
    TableLoad(String),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::TableLoad(format!("invalid JSON: {e}"))
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Worker(e.to_string())
    }
}

impl EngineError {
    /// Short machine-readable code, used in the CLI's JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            EngineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            EngineError::InvalidRecord { .. } => "INVALID_RECORD",
            EngineError::YearOutOfRange(_) => "YEAR_OUT_OF_RANGE",
            EngineError::TableLoad(_) => "TABLE_LOAD_ERROR",
            EngineError::Worker(_) => "WORKER_ERROR",
        }
    }

    /// `{"error": {"code", "message"}}` body printed by the CLI on failure.
    pub fn to_json(&self) -> Value {
        error_body(self.code(), &self.to_string())
    }
}

pub fn error_body(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_record_message_names_both_years() {
        let e = EngineError::InvalidRecord {
            start: 2020,
            end: 2018,
        };
        let msg = e.to_string();
        assert!(msg.contains("2020"));
        assert!(msg.contains("2018"));
    }

    #[test]
    fn test_json_error_maps_to_table_load() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let e: EngineError = err.into();
        assert_eq!(e.code(), "TABLE_LOAD_ERROR");
    }

    #[test]
    fn test_json_body_carries_code_and_message() {
        let body = EngineError::YearOutOfRange(-5).to_json();
        assert_eq!(body["error"]["code"], "YEAR_OUT_OF_RANGE");
        assert!(body["error"]["message"].as_str().unwrap().contains("-5"));
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EngineError::InvalidConfiguration(String::new()).code(),
            EngineError::ModelUnavailable(String::new()).code(),
            EngineError::InvalidRecord { start: 1, end: 0 }.code(),
            EngineError::YearOutOfRange(0).code(),
            EngineError::TableLoad(String::new()).code(),
            EngineError::Worker(String::new()).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
