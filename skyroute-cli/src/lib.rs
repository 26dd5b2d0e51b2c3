//! Command-line interface for planning SkyRoute delivery tours.
//!
//! The `solve` subcommand loads an instance file, runs one of the three
//! solvers under a wall-clock budget and prints a text or JSON report.
//! Arguments are layered with `ortho_config`: command-line flags override
//! `SKYROUTE_*` environment variables, which override configuration files.
#![forbid(unsafe_code)]

use std::fmt;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};

mod error;
mod report;
mod solve;

pub use error::CliError;

use solve::{DefaultSolverBuilder, SolveArgs, run_solve_with};

pub(crate) const ARG_INSTANCE: &str = "instance";
pub(crate) const ARG_TIME_LIMIT: &str = "time-limit";
pub(crate) const ARG_SOLVER: &str = "solver";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_BATTERY_CAPACITY: &str = "battery-capacity";
pub(crate) const ARG_RECHARGE_THRESHOLD: &str = "recharge-threshold";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ENV_INSTANCE: &str = "SKYROUTE_INSTANCE";
pub(crate) const ENV_TIME_LIMIT: &str = "SKYROUTE_TIME_LIMIT";

/// Run the SkyRoute CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError::ArgumentParsing`] for malformed invocations, which
/// include a missing instance path or time limit and unknown strategy tags
/// from any configuration layer. Other failures map to their own variant.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => {
            let mut stdout = std::io::stdout().lock();
            run_solve_with(args, &DefaultSolverBuilder, &mut stdout)
        }
    }
}

/// Usage error rendered against the `solve` subcommand.
pub(crate) fn solve_usage_error(kind: ErrorKind, message: impl fmt::Display) -> clap::Error {
    let mut cli = Cli::command();
    cli.build();
    match cli.find_subcommand_mut("solve") {
        Some(solve) => solve.error(kind, message),
        None => cli.error(kind, message),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "skyroute",
    about = "Plan battery-constrained drone delivery tours around no-fly zones",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a tour for one instance file.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
