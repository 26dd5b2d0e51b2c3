//! Solve report assembled from a solver response.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use skyroute_core::{CostPolicy, Instance, RoutePlan, SearchStats, SolveResponse};

use crate::solve::{SolveConfig, SolverKind};

const RULE_WIDTH: usize = 100;

/// Everything printed after a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct SolveReport {
    pub(crate) solver: SolverKind,
    pub(crate) strategy: StrategyReport,
    pub(crate) time_limit_secs: f64,
    pub(crate) battery_capacity: f64,
    pub(crate) recharge_threshold: f64,
    pub(crate) waypoints: usize,
    pub(crate) delivery_points: usize,
    pub(crate) recharge_points: usize,
    pub(crate) solve_time_secs: f64,
    pub(crate) plan: Option<PlanReport>,
    pub(crate) stats: StatsReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StrategyReport {
    pub(crate) code: u8,
    pub(crate) name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct PlanReport {
    pub(crate) route: Vec<String>,
    pub(crate) distance: f64,
    pub(crate) risk: f64,
    pub(crate) risk_per_leg: f64,
    pub(crate) consumption: f64,
    pub(crate) recharges: u32,
    pub(crate) deliveries_covered: usize,
    pub(crate) value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum StatsReport {
    Tree {
        nodes_explored: u64,
    },
    Annealing {
        attempts: u32,
        iterations: u64,
        generated: u64,
        accepted: u64,
        final_temperature: f64,
    },
}

impl From<SearchStats> for StatsReport {
    fn from(stats: SearchStats) -> Self {
        match stats {
            SearchStats::Tree { nodes_explored } => Self::Tree { nodes_explored },
            SearchStats::Annealing {
                attempts,
                iterations,
                generated,
                accepted,
                final_temperature,
            } => Self::Annealing {
                attempts,
                iterations,
                generated,
                accepted,
                final_temperature,
            },
        }
    }
}

impl PlanReport {
    fn new(instance: &Instance, plan: &RoutePlan) -> Self {
        let stops = plan.route.stops();
        let covered: HashSet<_> = stops
            .iter()
            .filter(|node| instance.is_delivery(**node))
            .collect();
        Self {
            route: plan
                .route
                .ids(instance)
                .into_iter()
                .map(str::to_owned)
                .collect(),
            distance: plan.metrics.distance,
            risk: plan.metrics.risk,
            risk_per_leg: plan.risk_per_leg(),
            consumption: plan.metrics.consumption,
            recharges: plan.metrics.recharges,
            deliveries_covered: covered.len(),
            value: plan.value,
        }
    }
}

impl SolveReport {
    pub(crate) fn new(config: &SolveConfig, instance: &Instance, response: &SolveResponse) -> Self {
        let policy = CostPolicy::new(config.strategy, &config.battery);
        Self {
            solver: config.solver,
            strategy: StrategyReport {
                code: config.strategy.code(),
                name: config.strategy.name(),
            },
            time_limit_secs: config.time_limit.as_secs_f64(),
            battery_capacity: policy.capacity(),
            recharge_threshold: policy.recharge_threshold(),
            waypoints: instance.point_count().saturating_sub(1),
            delivery_points: instance.deliveries().len(),
            recharge_points: instance.recharges().len(),
            solve_time_secs: response.diagnostics.solve_time.as_secs_f64(),
            plan: response
                .plan
                .as_ref()
                .map(|plan| PlanReport::new(instance, plan)),
            stats: response.diagnostics.stats.into(),
        }
    }

    fn write_stats(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stats {
            StatsReport::Tree { nodes_explored } => writeln!(f, "Nodes explored: {nodes_explored}"),
            StatsReport::Annealing {
                attempts,
                iterations,
                generated,
                accepted,
                final_temperature,
            } => {
                writeln!(f, "Las Vegas attempts: {attempts}")?;
                writeln!(f, "Iterations: {iterations}")?;
                writeln!(f, "Neighbours generated: {generated}")?;
                writeln!(f, "Neighbours accepted: {accepted}")?;
                writeln!(f, "Final temperature: {final_temperature:.3}")
            }
        }
    }
}

impl fmt::Display for SolveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "{}", self.solver.title())?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Strategy: {} ({})",
            self.strategy.code, self.strategy.name
        )?;
        writeln!(f, "Time limit: {:.1} s", self.time_limit_secs)?;
        writeln!(f, "Battery capacity: {:.1}", self.battery_capacity)?;
        writeln!(f, "Recharge threshold: {:.1}", self.recharge_threshold)?;
        writeln!(f, "Waypoints (excluding hub): {}", self.waypoints)?;
        writeln!(f, "Delivery points: {}", self.delivery_points)?;
        writeln!(f, "Recharge points: {}", self.recharge_points)?;
        writeln!(f, "{rule}")?;

        match &self.plan {
            Some(plan) => {
                writeln!(f, "Route: {}", plan.route.join(" -> "))?;
                writeln!(f, "Distance: {:.2}", plan.distance)?;
                writeln!(f, "Risk per leg: {:.2}", plan.risk_per_leg)?;
                writeln!(f, "Consumption: {:.2}", plan.consumption)?;
                writeln!(
                    f,
                    "Deliveries covered: {}/{}",
                    plan.deliveries_covered, self.delivery_points
                )?;
                writeln!(f, "Recharges: {}", plan.recharges)?;
            }
            None => writeln!(f, "No valid route found within the time limit.")?,
        }
        writeln!(f, "Solve time: {:.3} s", self.solve_time_secs)?;
        self.write_stats(f)?;
        writeln!(f, "{rule}")
    }
}
