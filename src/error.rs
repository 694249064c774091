//! Error types for abstracta-assist operations.
//!
//! This module defines [`AssistError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Step operations and display mappers return `anyhow::Result`; the executor
//!   never classifies their failures, it only attaches the step name
//! - Subsystems keep their own error enums ([`BackendError`], [`AgentError`],
//!   [`ContextError`]) and convert into `AssistError` at the boundary
//! - Use `anyhow::Error` (via `AssistError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::agent::AgentError;
use crate::backend::BackendError;

/// Core error type for abstracta-assist operations.
#[derive(Debug, Error)]
pub enum AssistError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The step list handed to the executor is inconsistent.
    #[error("Invalid step list: {message}")]
    InvalidStepList { message: String },

    /// A step's operation failed. The operation's error is kept as the source.
    #[error("Step '{step}' failed: {source:#}")]
    StepFailed {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// A display mapper failed while building a snapshot for a step.
    #[error("Display for step '{step}' failed: {source:#}")]
    DisplayFailed {
        step: String,
        #[source]
        source: anyhow::Error,
    },

    /// The Abstracta backend rejected or failed a request.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The payload agent failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AssistError {
    /// Name of the step this error belongs to, if it came out of a run.
    pub fn step(&self) -> Option<&str> {
        match self {
            Self::StepFailed { step, .. } | Self::DisplayFailed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Unwrap a step failure back into the operation's original error.
    ///
    /// Any other variant is returned wrapped as an `anyhow::Error`.
    pub fn into_step_source(self) -> anyhow::Error {
        match self {
            Self::StepFailed { source, .. } | Self::DisplayFailed { source, .. } => source,
            other => anyhow::Error::new(other),
        }
    }
}

/// Result type alias for abstracta-assist operations.
pub type Result<T> = std::result::Result<T, AssistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = AssistError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = AssistError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn invalid_step_list_displays_message() {
        let err = AssistError::InvalidStepList {
            message: "duplicate key 'auth'".into(),
        };
        assert!(err.to_string().contains("duplicate key 'auth'"));
    }

    #[test]
    fn step_failed_displays_step_and_source() {
        let err = AssistError::StepFailed {
            step: "Creating API".into(),
            source: anyhow::anyhow!("connection refused"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Creating API"));
        assert!(msg.contains("connection refused"));
        assert_eq!(err.step(), Some("Creating API"));
    }

    #[test]
    fn step_source_is_preserved_unchanged() {
        #[derive(Debug, thiserror::Error)]
        #[error("simulated network error")]
        struct NetworkDown;

        let err = AssistError::StepFailed {
            step: "fetch".into(),
            source: anyhow::Error::new(NetworkDown),
        };
        let source = err.into_step_source();
        assert!(source.downcast_ref::<NetworkDown>().is_some());
    }

    #[test]
    fn step_is_none_for_other_variants() {
        let err = AssistError::ConfigValidationError {
            message: "x".into(),
        };
        assert!(err.step().is_none());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AssistError = io_err.into();
        assert!(matches!(err, AssistError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(AssistError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
