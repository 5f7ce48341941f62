//! Error types for Folio.
//!
//! Library crates use [`FolioError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Folio operations.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Content store answered with a non-success status.
    #[error("content store error (HTTP {status}): {message}")]
    ContentStore { status: u16, message: String },

    /// An entry with the requested id already exists.
    #[error("entry already exists: {0}")]
    Conflict(String),

    /// Captioning model error (non-429 status or malformed response).
    #[error("captioning error: {0}")]
    Captioning(String),

    /// Captioning kept answering 429 past the configured retry cap.
    #[error("captioning rate limit persisted after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Email relay rejected the message.
    #[error("email relay error: {0}")]
    Relay(String),

    /// Response body could not be decoded.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (contact form fields, ids, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a content-store error from an HTTP status and body snippet.
    pub fn content_store(status: u16, msg: impl Into<String>) -> Self {
        Self::ContentStore {
            status,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
