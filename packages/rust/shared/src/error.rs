//! Error types for the Colab link helper.
//!
//! Library crates use [`ColabLinksError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Colab link operations.
#[derive(Debug, thiserror::Error)]
pub enum ColabLinksError {
    /// Missing credential, unreadable event payload, or malformed config.
    #[error("config error: {message}")]
    Config { message: String },

    /// A hosting API call failed (transport, HTTP status, or response body).
    #[error("remote API error during {operation}{}: {message}", status_suffix(.status))]
    RemoteApi {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// Branch lookup failed (no working copy, detached HEAD, git missing).
    #[error("repository state error: {message}")]
    RepositoryState { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ColabLinksError>;

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl ColabLinksError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a remote API error for the named operation.
    pub fn remote_api(
        operation: impl Into<String>,
        status: Option<u16>,
        msg: impl Into<String>,
    ) -> Self {
        Self::RemoteApi {
            operation: operation.into(),
            status,
            message: msg.into(),
        }
    }

    /// Create a repository state error from any displayable message.
    pub fn repository_state(msg: impl Into<String>) -> Self {
        Self::RepositoryState {
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

    /// HTTP status attached to a remote API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => *status,
            _ => None,
        }
    }
}
