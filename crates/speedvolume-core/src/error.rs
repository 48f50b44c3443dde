//! Error types

use thiserror::Error;

/// Errors surfaced to callers of the control loop
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Speed source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Control loop is not running")]
    LoopClosed,
}

/// Errors reported by a speed source when subscribing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeedSourceError {
    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    #[error("Location service not available: {0}")]
    Unavailable(String),
}

impl From<SpeedSourceError> for ControlError {
    fn from(err: SpeedSourceError) -> Self {
        match err {
            SpeedSourceError::PermissionDenied(msg) => ControlError::PermissionDenied(msg),
            SpeedSourceError::Unavailable(msg) => ControlError::SourceUnavailable(msg),
        }
    }
}

/// Errors reported by a volume sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Not authorized to change the volume")]
    Unauthorized,

    #[error("Volume write rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },

    #[error("Unknown mode: '{0}'")]
    UnknownMode(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
