//! Error types for tab-autoreload
//!
//! The reload engine itself never fails; these cover the ambient surfaces
//! around it (configuration, settings persistence, the scheduler channel).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur around the reload engine
#[derive(Debug, Error)]
pub enum AutoreloadError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings store could not be written
    #[error("Failed to write settings to {path}: {message}")]
    Settings { path: PathBuf, message: String },

    /// The scheduler task is gone (shut down or panicked)
    #[error("Reload scheduler is not running")]
    SchedulerClosed,

    /// The scheduler task panicked or was cancelled
    #[error("Reload scheduler task failed: {0}")]
    SchedulerFailed(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tab-autoreload operations
pub type AutoreloadResult<T> = Result<T, AutoreloadError>;
