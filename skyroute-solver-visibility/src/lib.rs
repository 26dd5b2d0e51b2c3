//! Visibility-graph solver for SkyRoute.
//!
//! [`VisibilitySolver`] first discards every edge whose segment crosses a
//! no-fly zone and then searches the remaining graph depth first without any
//! further geometric checks. Compared with branch-and-bound it adds explicit
//! loop breaking: each entered state is fingerprinted by its position,
//! deliveries, truncated battery and recent moves, and a repeated
//! fingerprint ends the branch. Candidate selection is narrower as well,
//! favouring the single best delivery and, when charge is running down, the
//! best recharge point.

#![forbid(unsafe_code)]

mod search;
mod solver;

pub use solver::{VisibilityConfig, VisibilitySolver};
