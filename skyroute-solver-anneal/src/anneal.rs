//! Las Vegas loop around construction and simulated annealing.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use skyroute_core::{
    CostPolicy, Instance, NodeId, Route, RoutePlan, RouteSimulator, SearchBudget, SearchStats,
};

use crate::AnnealingConfig;
use crate::construct::Constructor;
use crate::mutation::neighbour;

/// Result of one solve.
pub(crate) struct Outcome {
    pub(crate) best: Option<RoutePlan>,
    pub(crate) stats: SearchStats,
}

/// Mutable context of one solve.
pub(crate) struct Annealer<'a> {
    instance: &'a Instance,
    config: &'a AnnealingConfig,
    budget: &'a SearchBudget,
    rng: ChaCha8Rng,
    constructor: Constructor<'a>,
    simulator: RouteSimulator<'a>,
    iterations: u64,
    generated: u64,
    accepted: u64,
    temperature: f64,
}

impl<'a> Annealer<'a> {
    pub(crate) fn new(
        instance: &'a Instance,
        config: &'a AnnealingConfig,
        policy: CostPolicy,
        budget: &'a SearchBudget,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            instance,
            config,
            budget,
            rng,
            constructor: Constructor::new(instance, policy, config.construction_steps),
            simulator: RouteSimulator::new(instance, policy),
            iterations: 0,
            generated: 0,
            accepted: 0,
            temperature: config.initial_temperature,
        }
    }

    /// Repeat attempts until one yields a tour or the budget runs out.
    ///
    /// An instance without deliveries has no tour and returns at once.
    pub(crate) fn run(mut self) -> Outcome {
        if self.instance.deliveries().is_empty() {
            log::debug!("annealing: no deliveries to route");
            return self.outcome(None, 0);
        }
        let mut attempts: u32 = 0;
        let mut best = None;
        while !self.budget.should_stop() {
            attempts += 1;
            if let Some(plan) = self.attempt() {
                best = Some(plan);
                break;
            }
            log::debug!("annealing: attempt {attempts} found no initial tour");
        }
        self.outcome(best, attempts)
    }

    const fn outcome(&self, best: Option<RoutePlan>, attempts: u32) -> Outcome {
        Outcome {
            best,
            stats: SearchStats::Annealing {
                attempts,
                iterations: self.iterations,
                generated: self.generated,
                accepted: self.accepted,
                final_temperature: self.temperature,
            },
        }
    }

    fn attempt(&mut self) -> Option<RoutePlan> {
        let initial = self.construct()?;
        Some(self.refine(initial))
    }

    fn construct(&mut self) -> Option<RoutePlan> {
        for _ in 0..self.config.construction_attempts {
            if let Some(stops) = self.constructor.build(&mut self.rng) {
                return self.evaluate(stops);
            }
            if self.budget.should_stop() {
                break;
            }
        }
        None
    }

    /// Replay `stops`; `None` when they do not form a valid tour.
    fn evaluate(&mut self, stops: Vec<NodeId>) -> Option<RoutePlan> {
        let metrics = self.simulator.simulate(&stops).ok()?;
        let value =
            self.simulator
                .policy()
                .route_value(metrics.distance, metrics.risk, metrics.recharges);
        Some(RoutePlan {
            route: Route::new(stops),
            metrics,
            value,
        })
    }

    /// Simulated annealing from `initial`, returning the best tour seen.
    fn refine(&mut self, initial: RoutePlan) -> RoutePlan {
        let config = self.config;
        let hub = self.instance.hub();
        let mut current = initial.clone();
        let mut best = initial;
        let mut temperature = config.initial_temperature;
        let mut non_improving: u32 = 0;

        'cooling: while temperature > config.final_temperature && !self.budget.should_stop() {
            for _ in 0..config.iterations_per_temperature {
                self.iterations += 1;
                let stops = neighbour(current.route.stops(), hub, &mut self.rng);
                if let Some(candidate) = self.evaluate(stops) {
                    self.generated += 1;
                    let delta = candidate.value - current.value;
                    if delta < 0.0 {
                        if candidate.value < best.value {
                            best = candidate.clone();
                            non_improving = 0;
                        } else {
                            non_improving += 1;
                        }
                        current = candidate;
                        self.accepted += 1;
                    } else if self.rng.gen_range(0.0..1.0) < (-delta / temperature).exp() {
                        current = candidate;
                        self.accepted += 1;
                        non_improving += 1;
                    }
                }
                if self.budget.should_stop() || non_improving > config.max_non_improving {
                    break 'cooling;
                }
            }
            temperature *= config.cooling_factor;
        }

        self.temperature = temperature;
        log::debug!(
            "annealing: refined value {:.2} to {:.2}, temperature {temperature:.3}",
            current.value,
            best.value
        );
        best
    }
}
