//! Error types for talksite.
//!
//! Library crates use [`TalksiteError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all talksite operations.
#[derive(Debug, thiserror::Error)]
pub enum TalksiteError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A series file or aggregate could not be (de)serialized as JSON.
    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Data validation error (bad slug, bad aggregate name, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TalksiteError>;

impl TalksiteError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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

    /// Wrap a `serde_json::Error` with the file it came from.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TalksiteError::config("unknown key `serie`");
        assert_eq!(err.to_string(), "config error: unknown key `serie`");

        let err = TalksiteError::validation("slug 'a/b' contains a path separator");
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn json_error_mentions_path() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TalksiteError::json("data/kim.json", source);
        assert!(err.to_string().contains("kim.json"));
    }
}
