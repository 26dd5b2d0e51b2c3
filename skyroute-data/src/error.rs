//! Error types for instance loading.

use std::io;

use camino::Utf8PathBuf;
use skyroute_core::InstanceError;
use thiserror::Error;

/// Errors returned by [`crate::parse_instance`].
#[derive(Debug, Error)]
pub enum ParseInstanceError {
    /// The input is not a well-formed instance document.
    #[error("malformed instance document: {0}")]
    Json(#[from] serde_json::Error),
    /// The document is well formed but describes an invalid instance.
    #[error("invalid instance: {0}")]
    Invalid(#[from] InstanceError),
}

/// Errors returned by [`crate::load_instance`].
#[derive(Debug, Error)]
pub enum LoadInstanceError {
    /// Opening the file failed.
    #[error("failed to open instance file {path}: {source}")]
    Open {
        /// File that could not be opened.
        path: Utf8PathBuf,
        /// Source I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a well-formed instance document.
    #[error("failed to parse instance file {path}: {source}")]
    Parse {
        /// File being parsed.
        path: Utf8PathBuf,
        /// Source JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The file describes an invalid instance.
    #[error("instance file {path} is invalid: {source}")]
    Invalid {
        /// File being validated.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: InstanceError,
    },
}
