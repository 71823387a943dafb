//! src/error.rs
//! ============================================================================
//! # AppError: Unified Error Type for the Disk-Usage Analyzer
//!
//! This module defines the error enum (`AppError`) used across the entire
//! application. Each variant carries enough context for diagnostics, and all
//! major modules are expected to use `Result<T, AppError>` for consistency.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all analyzer operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The scan root is invalid or unreachable. Fatal to the scan.
    #[error("cannot scan {path:?}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An OS action hook (open/reveal/trash) failed.
    #[error("{op} failed for {path:?}: {detail}")]
    Action {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },

    /// An OS action hook did not finish within its deadline.
    #[error("{op} timed out for {path:?}")]
    Timeout { op: &'static str, path: PathBuf },

    /// Async task failure or join error.
    #[error("Async task failed: {0}")]
    Task(String),

    /// Operation cancelled by user or system.
    #[error("Operation was cancelled")]
    Cancelled,

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> AppError {
        AppError::Task(format!("{}: {}", ctx.into(), self))
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Task(e.to_string())
    }
}
