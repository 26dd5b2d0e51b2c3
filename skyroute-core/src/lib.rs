//! Core domain types for the SkyRoute drone-delivery planner.
//!
//! An [`Instance`] describes the static problem: typed waypoints, weighted
//! undirected edges and polygonal no-fly zones. Solvers implement
//! [`Solver`] and share the supporting pieces defined here: the geometric
//! predicates in [`geometry`], the strategy-driven [`CostPolicy`], the
//! persistent [`SearchState`], the memoised [`SafetyCache`] and the
//! wall-clock [`SearchBudget`]. [`RouteSimulator`] replays any stop sequence
//! and is the single authority on whether a tour is valid.
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod budget;
pub mod geometry;
mod model;
mod policy;
mod route;
mod safety;
mod solver;
mod state;
mod visibility;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use budget::{SearchBudget, StopSignal};
pub use model::{
    EdgeWeight, Graph, Instance, InstanceBuilder, InstanceError, NoFlyZone, NoFlyZoneError,
    NodeId, Point, PointKind,
};
pub use policy::{BatteryConfig, CandidateKind, CostPolicy, Strategy, StrategyParseError};
pub use route::{Route, RouteMetrics, RouteSimulator, RouteViolation, remove_short_cycles};
pub use safety::{SAFETY_HISTORY, SafetyCache, SafetyKey};
pub use solver::{
    Diagnostics, Error, RoutePlan, SearchStats, SolveError, SolveRequest,
    SolveRequestValidationError, SolveResponse, Solver,
};
pub use state::{DeliverySet, SearchState, Trail, TrailIter};
pub use visibility::VisibilityFilter;
