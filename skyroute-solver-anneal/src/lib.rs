//! Simulated-annealing solver for SkyRoute.
//!
//! [`AnnealingSolver`] is a Las Vegas algorithm. Each attempt builds a first
//! tour with a randomised greedy walk from the hub and then refines it with
//! simulated annealing, mutating the tour's interior and re-simulating every
//! candidate in full. Attempts whose walk strands the drone are discarded and
//! retried until one succeeds or the time budget runs out, so a returned
//! plan is always a valid tour.
//!
//! All randomness comes from a `ChaCha8Rng` seeded from
//! [`SolveRequest::seed`](skyroute_core::SolveRequest::seed), which makes a
//! solve reproducible whenever the budget does not cut it short.

#![forbid(unsafe_code)]

mod anneal;
mod construct;
mod mutation;
mod solver;

pub use solver::{AnnealingConfig, AnnealingSolver};
