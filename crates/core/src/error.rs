//! Error types for repoprompt.
//!
//! Uses `thiserror` for ergonomic error definitions. File-access failures
//! inside a run are normally degraded by the caller (skip or placeholder);
//! the variants here are what is left when a failure is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all repoprompt operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Filesystem ---
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Templates ---
    #[error("Template error: {0}")]
    Template(String),

    // --- Invocation ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an `std::io::Error` together with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = Error::io(
            "/tmp/out.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn invalid_input_displays_correctly() {
        let err = Error::InvalidInput("--dir is not a directory".into());
        assert_eq!(err.to_string(), "Invalid input: --dir is not a directory");
    }
}
