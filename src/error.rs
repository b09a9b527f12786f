//! Error types for secret-mask operations.
//!
//! This module defines [`MaskError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Construction errors (empty patterns, bad config) fail fast and synchronously
//! - Sink write errors are latched by the pump and only surface through
//!   [`Masker::flush`](crate::masker::Masker::flush) or
//!   [`Masker::close`](crate::masker::Masker::close)
//! - Use `anyhow::Error` (via `MaskError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for secret-mask operations.
#[derive(Debug, Error)]
pub enum MaskError {
    /// A pattern with no bytes was registered.
    #[error("Pattern {index} is empty; empty patterns cannot be masked")]
    EmptyPattern { index: usize },

    /// The stream pump was started more than once.
    #[error("Masker is already running")]
    AlreadyRunning,

    /// The underlying sink failed while the pump was forwarding output.
    #[error("Failed to write masked output: {0}")]
    Sink(#[source] std::io::Error),

    /// The stream pump has shut down and can no longer accept requests.
    #[error("Masker has been closed")]
    PumpStopped,

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Child command could not be started or waited on.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for secret-mask operations.
pub type Result<T> = std::result::Result<T, MaskError>;
