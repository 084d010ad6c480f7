//! Error types for spacehub.

use thiserror::Error;

/// Common error type for spacehub.
#[derive(Error, Debug)]
pub enum SpacehubError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A resolved path escaped the storage root.
    #[error("path escapes storage root: {0}")]
    PathViolation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Deploy pipeline error.
    #[error("deploy error: {0}")]
    Deploy(String),
}

/// Result type alias for spacehub operations.
pub type Result<T> = std::result::Result<T, SpacehubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = SpacehubError::Validation("author name is empty".to_string());
        assert_eq!(err.to_string(), "validation error: author name is empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = SpacehubError::NotFound("submission".to_string());
        assert_eq!(err.to_string(), "submission not found");
    }

    #[test]
    fn test_path_violation_display() {
        let err = SpacehubError::PathViolation("../../etc/passwd".to_string());
        assert!(err.to_string().contains("escapes storage root"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SpacehubError = io_err.into();
        assert!(matches!(err, SpacehubError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: SpacehubError = json_err.into();
        assert!(matches!(err, SpacehubError::Json(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(SpacehubError::Deploy("git pull failed".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
