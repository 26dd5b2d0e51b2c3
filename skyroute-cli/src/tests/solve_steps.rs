//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{SINGLE_DELIVERY, Workspace};
use super::*;
use crate::solve::{SolveConfig, SolverBuilder};
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use skyroute_core::{
    Diagnostics, Instance, SearchStats, SolveError, SolveRequest, SolveResponse, Solver,
};
use std::cell::RefCell;

struct SolveWorld {
    workspace: Workspace,
    instance_path: Utf8PathBuf,
    include_instance: RefCell<bool>,
    strategy: RefCell<Option<String>>,
    cli_args: RefCell<Vec<String>>,
    stub_solver: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let instance_path = workspace.path("instance.json");
        Self {
            workspace,
            instance_path,
            include_instance: RefCell::new(true),
            strategy: RefCell::new(None),
            cli_args: RefCell::new(Vec::new()),
            stub_solver: RefCell::new(false),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["skyroute".to_owned(), "solve".to_owned()];
        if *self.include_instance.borrow() {
            argv.push(self.instance_path.as_str().to_owned());
            argv.push("2".to_owned());
            if let Some(strategy) = self.strategy.borrow().as_ref() {
                argv.push(strategy.clone());
            }
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn stdout(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }

    /// What the binary would print for the recorded clap error.
    fn rendered_error(&self) -> String {
        match &*self.error() {
            CliError::ArgumentParsing(err) => err.render().to_string(),
            other => panic!("expected ArgumentParsing, found {other:?}"),
        }
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

struct EmptySolver;

impl Solver for EmptySolver {
    fn solve(
        &self,
        _instance: &Instance,
        request: &SolveRequest,
    ) -> Result<SolveResponse, SolveError> {
        Ok(SolveResponse {
            plan: None,
            diagnostics: Diagnostics {
                solve_time: request.time_limit,
                stats: SearchStats::Tree { nodes_explored: 0 },
            },
        })
    }
}

struct EmptySolverBuilder;

impl SolverBuilder for EmptySolverBuilder {
    fn build(&self, _config: &SolveConfig) -> Box<dyn Solver> {
        Box::new(EmptySolver)
    }
}

#[given("an instance file with one delivery")]
fn instance_with_one_delivery(#[from(world)] world: &SolveWorld) {
    let written = world.workspace.write("instance.json", SINGLE_DELIVERY);
    assert_eq!(written, world.instance_path);
}

#[given("the instance file does not exist")]
fn instance_file_absent(#[from(world)] world: &SolveWorld) {
    assert!(!world.instance_path.exists());
}

#[given("I omit the instance path and time limit")]
fn omit_instance_path(#[from(world)] world: &SolveWorld) {
    *world.include_instance.borrow_mut() = false;
}

#[given("the solver {name}")]
fn choose_solver(#[from(world)] world: &SolveWorld, name: String) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_SOLVER}"), name]);
}

#[given("the strategy tag {tag}")]
fn choose_strategy(#[from(world)] world: &SolveWorld, tag: String) {
    world.strategy.replace(Some(tag));
}

#[given("JSON output is requested")]
fn request_json(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_FORMAT}"), "json".to_owned()]);
}

#[given("a solver that never finds a route")]
fn use_empty_solver(#[from(world)] world: &SolveWorld) {
    *world.stub_solver.borrow_mut() = true;
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let mut buffer = world.stdout.borrow_mut();
            if *world.stub_solver.borrow() {
                run_solve_with(args, &EmptySolverBuilder, &mut *buffer)
            } else {
                run_solve_with(args, &DefaultSolverBuilder, &mut *buffer)
            }
        }
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &SolveWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err:?}");
    }
}

#[then("the report shows the route HUB -> D1 -> HUB")]
fn report_shows_route(#[from(world)] world: &SolveWorld) {
    let stdout = world.stdout();
    assert!(stdout.contains("Route: HUB -> D1 -> HUB"), "{stdout}");
}

#[then("the JSON report lists {count} stops")]
fn json_lists_stops(#[from(world)] world: &SolveWorld, count: usize) {
    let report: Value = serde_json::from_str(&world.stdout()).expect("JSON report");
    let route = report["plan"]["route"].as_array().expect("route array");
    assert_eq!(route.len(), count);
    assert_eq!(report["stats"]["kind"], "annealing");
}

#[then("the report says no route was found")]
fn report_has_no_route(#[from(world)] world: &SolveWorld) {
    let stdout = world.stdout();
    assert!(stdout.contains("No valid route"), "{stdout}");
}

#[then("the command fails because the instance file is missing")]
fn fails_missing_instance_file(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::MissingSourceFile { path, .. } => assert_eq!(*path, world.instance_path),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[then("the command fails with a usage error")]
fn fails_with_usage_error(#[from(world)] world: &SolveWorld) {
    assert!(matches!(&*world.error(), CliError::ArgumentParsing(_)));
}

#[then("the error output shows the solve usage")]
fn shows_solve_usage(#[from(world)] world: &SolveWorld) {
    let rendered = world.rendered_error();
    assert!(rendered.contains("Usage: skyroute solve"), "{rendered}");
}

#[then("the error output mentions {text}")]
fn error_mentions(#[from(world)] world: &SolveWorld, text: String) {
    let rendered = world.rendered_error();
    assert!(rendered.contains(&text), "{rendered}");
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_text_report, "solving an instance prints a text report");
register_solve_scenario!(solve_json_report, "annealing results can be printed as JSON");
register_solve_scenario!(solve_without_route, "reporting when no route is found");
register_solve_scenario!(solve_missing_path, "rejecting missing instance paths");
register_solve_scenario!(solve_missing_file, "rejecting instance files that do not exist");
register_solve_scenario!(solve_unknown_strategy, "rejecting unknown strategy tags");
register_solve_scenario!(solve_unknown_solver, "rejecting unknown solver names");
