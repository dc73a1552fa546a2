//! Error types for the revu core engine
//!
//! We use `thiserror` for ergonomic error definitions with automatic
//! Display/Error implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Tool input rejected before the handler ran
    #[error("validation failed for tool '{tool}': {message}")]
    Validation { tool: String, message: String },

    /// Tool handler fault, caught at the dispatch boundary
    #[error("tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },

    /// No tool registered under the requested name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Coarse failure class reported back to the model as part of a
    /// tool-result payload.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation { .. }
            | CoreError::UnknownTool(_)
            | CoreError::InvalidConfig(_) => "validation",
            _ => "execution",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kind() {
        let err = CoreError::Validation {
            tool: "generate_commit_message".to_string(),
            message: "missing field `changes`".to_string(),
        };
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().contains("generate_commit_message"));
    }

    #[test]
    fn test_execution_kind() {
        let err = CoreError::Execution {
            tool: "get_file_changes".to_string(),
            message: "not a repository".to_string(),
        };
        assert_eq!(err.kind(), "execution");
    }

    #[test]
    fn test_io_maps_to_execution_kind() {
        let err = CoreError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.kind(), "execution");
    }
}
