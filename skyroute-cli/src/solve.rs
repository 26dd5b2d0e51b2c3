//! Solve command implementation for the SkyRoute CLI.

use std::ffi::OsStr;
use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use clap::{Arg, Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use skyroute_core::{BatteryConfig, SolveRequest, Solver, Strategy};
use skyroute_data::load_instance;
use skyroute_solver_anneal::{AnnealingConfig, AnnealingSolver};
use skyroute_solver_bnb::{BranchAndBoundConfig, BranchAndBoundSolver};
use skyroute_solver_visibility::{VisibilityConfig, VisibilitySolver};

use crate::report::SolveReport;
use crate::{
    ARG_BATTERY_CAPACITY, ARG_FORMAT, ARG_INSTANCE, ARG_RECHARGE_THRESHOLD, ARG_SEED, ARG_SOLVER,
    ARG_TIME_LIMIT, CliError, ENV_INSTANCE, ENV_TIME_LIMIT,
};

/// Search algorithm selected for a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SolverKind {
    /// Depth-first branch-and-bound.
    #[default]
    BranchAndBound,
    /// Depth-first search over the visibility graph.
    Visibility,
    /// Las Vegas simulated annealing.
    Annealing,
}

impl SolverKind {
    /// Report banner.
    pub(crate) const fn title(self) -> &'static str {
        match self {
            Self::BranchAndBound => "BRANCH-AND-BOUND SEARCH WITH HEURISTIC BOUND PRUNING",
            Self::Visibility => "DEPTH-FIRST SEARCH OVER THE VISIBILITY GRAPH",
            Self::Annealing => "SIMULATED ANNEALING SEARCH (LAS VEGAS)",
        }
    }
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON document.
    Json,
}

/// Accepts strategy tags `Strategy` can parse and keeps the raw text, so the
/// value layers like every other field. Failures carry the command usage.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StrategyTagParser;

impl TypedValueParser for StrategyTagParser {
    type Value = String;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        _arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(tag) = value.to_str() else {
            return Err(cmd
                .clone()
                .error(ErrorKind::InvalidUtf8, "strategy tag is not valid UTF-8"));
        };
        tag.parse::<Strategy>()
            .map(|_| tag.to_owned())
            .map_err(|err| cmd.clone().error(ErrorKind::InvalidValue, err))
    }
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a delivery tour for an instance file. The drone leaves \
                 the hub fully charged, must visit every delivery point once \
                 and return, and may refill at recharge points. Options can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Plan a delivery tour"
)]
#[ortho_config(prefix = "SKYROUTE")]
pub(crate) struct SolveArgs {
    /// Path to the JSON instance file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) instance: Option<Utf8PathBuf>,
    /// Wall-clock budget in whole seconds.
    #[arg(value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit: Option<u64>,
    /// Strategy code (1-5) or name; balanced when omitted.
    #[arg(value_name = "strategy", value_parser = StrategyTagParser)]
    #[serde(default)]
    pub(crate) strategy: Option<String>,
    /// Search algorithm.
    #[arg(long = ARG_SOLVER, value_enum, value_name = "solver")]
    #[serde(default)]
    pub(crate) solver: Option<SolverKind>,
    /// Seed for the annealing solver.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Full battery charge.
    #[arg(long = ARG_BATTERY_CAPACITY, value_name = "charge")]
    #[serde(default)]
    pub(crate) battery_capacity: Option<f64>,
    /// Charge under which the drone refills at recharge points.
    #[arg(long = ARG_RECHARGE_THRESHOLD, value_name = "charge")]
    #[serde(default)]
    pub(crate) recharge_threshold: Option<f64>,
    /// Report format.
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged).map_err(CliError::into_usage)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    pub(crate) instance: Utf8PathBuf,
    pub(crate) time_limit: Duration,
    pub(crate) strategy: Strategy,
    pub(crate) solver: SolverKind,
    pub(crate) seed: u64,
    pub(crate) battery: BatteryConfig,
    pub(crate) format: OutputFormat,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.instance, ARG_INSTANCE)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match skyroute_data::fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Request handed to the solver.
    pub(crate) fn request(&self) -> SolveRequest {
        SolveRequest::new(self.time_limit)
            .with_strategy(self.strategy)
            .with_seed(self.seed)
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let instance = args.instance.ok_or(CliError::MissingArgument {
            field: ARG_INSTANCE,
            env: ENV_INSTANCE,
        })?;
        let seconds = args.time_limit.ok_or(CliError::MissingArgument {
            field: ARG_TIME_LIMIT,
            env: ENV_TIME_LIMIT,
        })?;
        let strategy = args
            .strategy
            .as_deref()
            .map(str::parse::<Strategy>)
            .transpose()?
            .unwrap_or_default();

        let defaults = BatteryConfig::default();
        let battery = BatteryConfig {
            capacity: args.battery_capacity.unwrap_or(defaults.capacity),
            recharge_threshold: args
                .recharge_threshold
                .unwrap_or(defaults.recharge_threshold),
        };

        Ok(Self {
            instance,
            time_limit: Duration::from_secs(seconds),
            strategy,
            solver: args.solver.unwrap_or_default(),
            seed: args.seed.unwrap_or_default(),
            battery,
            format: args.format.unwrap_or_default(),
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(crate) trait SolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn Solver>;
}

/// Builds the solver named by the configuration with its battery settings.
pub(crate) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Box<dyn Solver> {
        let battery = config.battery;
        match config.solver {
            SolverKind::BranchAndBound => {
                Box::new(BranchAndBoundSolver::with_config(BranchAndBoundConfig {
                    battery,
                    ..BranchAndBoundConfig::default()
                }))
            }
            SolverKind::Visibility => Box::new(VisibilitySolver::with_config(VisibilityConfig {
                battery,
                ..VisibilityConfig::default()
            })),
            SolverKind::Annealing => Box::new(AnnealingSolver::with_config(AnnealingConfig {
                battery,
                ..AnnealingConfig::default()
            })),
        }
    }
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let report = execute_solve(&config, builder)?;
    write_report(writer, &report, config.format)
}

fn execute_solve(config: &SolveConfig, builder: &dyn SolverBuilder) -> Result<SolveReport, CliError> {
    let instance = load_instance(&config.instance)?;
    let request = config.request();
    log::info!(
        "solving {} with {:?}, strategy {}",
        config.instance,
        config.solver,
        config.strategy
    );
    let solver = builder.build(config);
    let response = solver
        .solve(&instance, &request)
        .map_err(|source| CliError::Solve { source })?;
    Ok(SolveReport::new(config, &instance, &response))
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn write_report(
    writer: &mut dyn Write,
    report: &SolveReport,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => write!(writer, "{report}").map_err(CliError::WriteOutput),
        OutputFormat::Json => {
            let payload =
                serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
            writer
                .write_all(payload.as_bytes())
                .map_err(CliError::WriteOutput)?;
            writer.write_all(b"\n").map_err(CliError::WriteOutput)
        }
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
