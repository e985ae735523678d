//! Error types shared across Blinkmouse crates.
//!
//! The analyzer core itself never fails; these errors come from the
//! surrounding session (sinks, traces, configuration files).

use std::path::PathBuf;

/// Top-level error type for Blinkmouse operations.
#[derive(Debug, thiserror::Error)]
pub enum BlinkmouseError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Pointer sink error: {message}")]
    Sink { message: String },

    #[error("Trace error: {message}")]
    Trace { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BlinkmouseError.
pub type BlinkmouseResult<T> = Result<T, BlinkmouseError>;

impl BlinkmouseError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink {
            message: msg.into(),
        }
    }

    pub fn trace(msg: impl Into<String>) -> Self {
        Self::Trace {
            message: msg.into(),
        }
    }
}
