//! `AnnealingSolver` and its configuration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skyroute_core::{
    BatteryConfig, CostPolicy, Diagnostics, Instance, SearchBudget, SolveError, SolveRequest,
    SolveResponse, Solver,
};

use crate::anneal::Annealer;

/// Configuration for [`AnnealingSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealingConfig {
    /// Battery capacity and base recharge threshold.
    pub battery: BatteryConfig,
    /// Temperature at the start of each refinement.
    pub initial_temperature: f64,
    /// Refinement stops once the temperature is no longer above this floor.
    pub final_temperature: f64,
    /// Multiplier applied to the temperature after each round.
    pub cooling_factor: f64,
    /// Neighbours tried per temperature round.
    pub iterations_per_temperature: u32,
    /// Consecutive accepted moves without a new best that end refinement.
    pub max_non_improving: u32,
    /// Moves allowed to a single construction walk.
    pub construction_steps: usize,
    /// Construction walks tried per Las Vegas attempt.
    pub construction_attempts: u32,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            battery: BatteryConfig::default(),
            initial_temperature: 1000.0,
            final_temperature: 0.1,
            cooling_factor: 0.95,
            iterations_per_temperature: 100,
            max_non_improving: 500,
            construction_steps: 100,
            construction_attempts: 50,
        }
    }
}

/// Seeded Las Vegas solver built on simulated annealing.
#[derive(Debug, Clone, Default)]
pub struct AnnealingSolver {
    config: AnnealingConfig,
}

impl AnnealingSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AnnealingConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: AnnealingConfig) -> Self {
        Self { config }
    }

    /// Configuration in force.
    #[must_use]
    pub const fn config(&self) -> &AnnealingConfig {
        &self.config
    }
}

impl Solver for AnnealingSolver {
    fn solve(&self, instance: &Instance, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        request.validate(&self.config.battery)?;
        let budget = SearchBudget::start(request.time_limit, request.stop.clone());
        let policy = CostPolicy::new(request.strategy, &self.config.battery);
        let rng = ChaCha8Rng::seed_from_u64(request.seed);
        log::debug!(
            "annealing: strategy {}, threshold {:.1}, seed {}, limit {:?}",
            request.strategy,
            policy.recharge_threshold(),
            request.seed,
            request.time_limit
        );

        let outcome = Annealer::new(instance, &self.config, policy, &budget, rng).run();
        let solve_time = budget.elapsed();
        match &outcome.best {
            Some(plan) => log::info!(
                "annealing: value {:.2} in {solve_time:?} ({:?})",
                plan.value,
                outcome.stats
            ),
            None => log::warn!(
                "annealing: no valid route before the deadline ({:?})",
                outcome.stats
            ),
        }

        Ok(SolveResponse {
            plan: outcome.best,
            diagnostics: Diagnostics {
                solve_time,
                stats: outcome.stats,
            },
        })
    }
}
