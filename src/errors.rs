//! Error taxonomy for fluxcheck.
//!
//! Failures are recovered at the narrowest scope possible. Only
//! [`Error::StageFailure`] is allowed to abort a multi-stage run; every other
//! variant is converted into issue lists by the endpoint validator or the
//! dimension guard before it reaches the pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for fluxcheck operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required artifact does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// File system errors other than a missing file
    #[error("File system error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Specification document errors
    #[error("Specification error: {0}")]
    Specification(String),

    /// An endpoint reference that does not resolve to exactly one entry
    #[error("Unknown endpoint '{endpoint}' in feature '{feature}'")]
    UnknownEndpoint { feature: String, endpoint: String },

    /// Target argument could not be turned into a validation scope
    #[error("Invalid target: {0}")]
    Scope(String),

    /// Unexpected failure while computing one dimension
    #[error("Scoring failed for {dimension}: {message}")]
    Scoring { dimension: String, message: String },

    /// A named pipeline stage returned failure or crashed
    #[error("Stage '{stage}' failed: {message}")]
    StageFailure { stage: String, message: String },

    /// External type-checker could not be run
    #[error("Type checker error: {0}")]
    TypeCheck(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build the error for a failed read, keeping "not found" distinct
    pub fn from_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn scoring(dimension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scoring {
            dimension: dimension.into(),
            message: message.into(),
        }
    }

    pub fn stage_failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }

    pub fn is_file_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_other_io_errors() {
        let missing = Error::from_io(
            "a/b.ts",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(missing.is_file_not_found());

        let denied = Error::from_io(
            "a/b.ts",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(!denied.is_file_not_found());
        assert!(denied.to_string().contains("a/b.ts"));
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(Error::Specification("missing endpoints".into()));
        let err = result.context("loading users").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading users: Specification error: missing endpoints"
        );
    }
}
