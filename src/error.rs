//! Error taxonomy for the quota poller.
//!
//! Every failure is fatal to a fetch run. `ErrorKind` groups the variants into
//! the three classes the CI job cares about and picks the process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PollerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential or unusable configuration.
    Configuration,
    /// Vendor API failure or unexpected response shape.
    Upstream,
    /// Output could not be written.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Configuration => 2,
            ErrorKind::Upstream => 3,
            ErrorKind::Io => 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("OpenAI admin API key not configured. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse costs response: {0}")]
    Parse(String),

    #[error("Inconsistent pagination: {0}")]
    Pagination(String),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PollerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PollerError::MissingApiKey(_) | PollerError::Config(_) => ErrorKind::Configuration,
            PollerError::Network(_)
            | PollerError::Api { .. }
            | PollerError::Parse(_)
            | PollerError::Pagination(_) => ErrorKind::Upstream,
            PollerError::Write { .. } | PollerError::Serialize(_) => ErrorKind::Io,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PollerError::Write {
            path: path.into(),
            source,
        }
    }
}
