//! Error taxonomy for the pipeline.
//!
//! Every core operation either returns a fully valid result or one of these
//! errors. Only the CLI entrypoint translates them into exit codes.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::canonical::EncodingError;
use crate::core::transform::ProcessingError;

/// Exit code for recognized pipeline failures (bad inputs, bad config)
pub const EXIT_PIPELINE_FAILURE: u8 = 2;

/// Exit code for everything else
pub const EXIT_UNEXPECTED_FAILURE: u8 = 3;

/// Failures raised by the deterministic core
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or invalid input files, empty pipeline version
    #[error("{0}")]
    InputValidation(String),

    /// Missing, unreadable, malformed or schema-invalid config
    #[error("{0}")]
    Config(String),

    /// Failed to read a file while hashing or loading inputs
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

impl PipelineError {
    pub(crate) fn input(msg: impl Into<String>) -> Self {
        Self::InputValidation(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is one of the recognized, user-facing pipeline failures
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::InputValidation(_) | Self::Config(_))
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        if self.is_recognized() {
            EXIT_PIPELINE_FAILURE
        } else {
            EXIT_UNEXPECTED_FAILURE
        }
    }
}
