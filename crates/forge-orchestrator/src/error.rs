//! Error types for the courseforge pipeline.
//!
//! Element-level problems (validation findings, delivery retry exhaustion)
//! are recorded in the run log, not raised as errors; this hierarchy covers
//! run-level failures only. Fatal errors abort the state machine, while the
//! rest surface after the report has been written.

use std::path::PathBuf;

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Run-level errors from the courseforge pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    // ========================================================================
    // Configuration errors
    // ========================================================================
    /// Configuration file exists but cannot be parsed.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your courseforge.json with a JSON linter")]
    ConfigParse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration values failed validation.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Setup errors
    // ========================================================================
    /// The course taxonomy does not have the expected fixed shape.
    #[error("Invalid course structure: {message}\n\nSuggestion: The catalog must contain 5 units with 3 themes each")]
    Structure {
        /// Description of the shape deviation.
        message: String,
    },

    /// The platform rejected the credentials.
    #[error("Authentication failed: {message}\n\nSuggestion: Check the platform credentials in courseforge.json")]
    Authentication {
        /// Detail from the transport.
        message: String,
    },

    /// The course container could not be created, so nothing can be
    /// delivered.
    #[error("Course container creation failed: {message}")]
    CourseCreation {
        /// Detail from the transport.
        message: String,
    },

    // ========================================================================
    // Report errors
    // ========================================================================
    /// A report artifact could not be written.
    #[error("Failed to write report to '{path}': {message}\n\nSuggestion: Check write permissions and available disk space")]
    ReportWrite {
        /// Destination path.
        path: PathBuf,
        /// Description of the write failure.
        message: String,
    },

    /// Other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Creates a `ConfigParse` error.
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a `ConfigValidation` error.
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Returns `true` if this error aborts the run before delivery could
    /// meaningfully proceed.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_orchestrator::PipelineError;
    ///
    /// let err = PipelineError::Authentication { message: "401".into() };
    /// assert!(err.is_fatal());
    /// ```
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::Structure { .. }
                | Self::Authentication { .. }
                | Self::CourseCreation { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PipelineError::Structure {
            message: "4 units".to_string()
        }
        .is_fatal());
        assert!(PipelineError::Authentication {
            message: "rejected".to_string()
        }
        .is_fatal());
        assert!(PipelineError::CourseCreation {
            message: "server error".to_string()
        }
        .is_fatal());
        assert!(!PipelineError::ReportWrite {
            path: PathBuf::from("out.csv"),
            message: "denied".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_messages_carry_suggestions() {
        let err = PipelineError::config_validation("bad mode", "use simulation or live");
        assert!(err.to_string().contains("Suggestion: use simulation or live"));
    }
}
