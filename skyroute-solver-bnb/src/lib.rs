//! Depth-first branch-and-bound solver for SkyRoute.
//!
//! This crate provides [`BranchAndBoundSolver`], an implementation of the
//! [`Solver`](skyroute_core::Solver) trait that explores tours depth first
//! from the hub. Candidate moves are filtered for battery, repeated
//! deliveries and no-fly safety, ranked with the strategy's
//! [`CostPolicy`](skyroute_core::CostPolicy) and limited to a small fan-out.
//! Branches are cut by a depth cap, an optimistic distance bound against the
//! incumbent and, once the search is large, a more aggressive distance cut.
//!
//! The search is deterministic: the same instance, strategy and
//! configuration always produce the same tour unless the time budget cuts
//! the search short.

#![forbid(unsafe_code)]

mod search;
mod solver;

pub use solver::{BranchAndBoundConfig, BranchAndBoundSolver};
