//! Error types emitted by the SkyRoute CLI.
//!
//! Variants carry paths and source errors only, so `CliError` stays under the
//! `clippy::result_large_err` limit.

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::error::ErrorKind;
use skyroute_core::{SolveError, StrategyParseError};
use skyroute_data::LoadInstanceError;
use thiserror::Error;

/// Errors emitted by the SkyRoute CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it on the command line or set {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that may supply it.
        env: &'static str,
    },
    /// The strategy tag is neither a code nor a known name.
    #[error(transparent)]
    InvalidStrategy(#[from] StrategyParseError),
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Argument the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The instance file could not be loaded.
    #[error(transparent)]
    LoadInstance(#[from] LoadInstanceError),
    /// The solver rejected the request.
    #[error("solver failed: {source}")]
    Solve {
        /// Solver error.
        source: SolveError,
    },
    /// Serialising the report failed.
    #[error("failed to serialise solve report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the report failed.
    #[error("failed to write solve output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Recast invocation mistakes found after layering as usage errors, so
    /// they print the `solve` usage and exit with status 2.
    pub(crate) fn into_usage(self) -> Self {
        let kind = match &self {
            Self::MissingArgument { .. } => ErrorKind::MissingRequiredArgument,
            Self::InvalidStrategy(_) => ErrorKind::InvalidValue,
            _ => return self,
        };
        Self::ArgumentParsing(crate::solve_usage_error(kind, &self))
    }
}
