//! Facade crate for the SkyRoute drone-delivery planner.
//!
//! This crate re-exports the core domain types and exposes the instance
//! loader and the three solvers behind feature flags.

#![forbid(unsafe_code)]

pub use skyroute_core::{
    BatteryConfig, Diagnostics, EdgeWeight, Instance, InstanceBuilder, InstanceError, NodeId,
    PointKind, Route, RouteMetrics, RoutePlan, RouteSimulator, RouteViolation, SearchStats,
    SolveError, SolveRequest, SolveResponse, Solver, StopSignal, Strategy,
};

#[cfg(feature = "data")]
pub use skyroute_data::{LoadInstanceError, ParseInstanceError, load_instance, parse_instance};

#[cfg(feature = "solver-bnb")]
pub use skyroute_solver_bnb::{BranchAndBoundConfig, BranchAndBoundSolver};

#[cfg(feature = "solver-visibility")]
pub use skyroute_solver_visibility::{VisibilityConfig, VisibilitySolver};

#[cfg(feature = "solver-anneal")]
pub use skyroute_solver_anneal::{AnnealingConfig, AnnealingSolver};
