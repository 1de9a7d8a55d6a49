//! Error types for link reconciliation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving configuration or reconciling links.
///
/// Configuration variants are fatal and raised before any mutation.
/// `Conflict` and `Io` are reported per entry and never abort a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The requested category code is not in the allow-list.
    #[error("unsupported language '{code}'. Supported languages: {}", supported.join(", "))]
    UnsupportedCategory {
        /// Code passed on the command line.
        code: String,
        /// The allow-list.
        supported: Vec<&'static str>,
    },

    /// The category's source root directory does not exist.
    #[error("source directory not found: {}", path.display())]
    MissingSourceRoot {
        /// Expected root directory.
        path: PathBuf,
    },

    /// Any other configuration problem (no home directory, bad repo path).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target is occupied by something that is not a symlink.
    #[error("{} already exists and is not a symlink ({occupant})", target.display())]
    Conflict {
        /// The occupied target path.
        target: PathBuf,
        /// What occupies it (`file`, `directory`, ...).
        occupant: String,
    },

    /// A filesystem call failed.
    #[error("failed to {op} {}: {message}", path.display())]
    Io {
        /// Operation that failed (`create symlink`, `remove link`, ...).
        op: &'static str,
        /// Path the operation acted on.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// Recording or replaying a filesystem cassette failed.
    #[error("cassette error: {0}")]
    Cassette(String),
}

impl LinkError {
    /// Builds an `Io` error from a port failure.
    pub fn io(
        op: &'static str,
        path: impl Into<PathBuf>,
        err: &(dyn std::error::Error + Send + Sync),
    ) -> Self {
        Self::Io { op, path: path.into(), message: err.to_string() }
    }

    /// Returns `true` for errors that must abort the run before mutation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCategory { .. }
                | Self::MissingSourceRoot { .. }
                | Self::Configuration(_)
        )
    }
}
