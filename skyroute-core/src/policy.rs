//! Strategy-selected scoring of candidate edges and complete routes.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::EdgeWeight;

/// Risk weight used by the balanced profile and as the default blend.
const RISK_WEIGHT: f64 = 50.0;
/// Priority multiplier for non-recharge edges while the battery is low.
const LOW_BATTERY_PENALTY: f64 = 5.0;
/// Priority multiplier for recharge edges while the battery is low.
const LOW_BATTERY_RECHARGE_BIAS: f64 = 0.01;
/// Priority multiplier for edges leading to a pending delivery.
const PENDING_DELIVERY_DISCOUNT: f64 = 0.3;

/// Named optimisation profile.
///
/// The numeric codes match the command-line tags `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Minimise distance only.
    Distance = 1,
    /// Minimise risk, with distance as a secondary term.
    Risk = 2,
    /// Distance plus fifty times risk.
    #[default]
    Balanced = 3,
    /// Raise the recharge threshold and penalise consumption.
    EarlyRecharge = 4,
    /// Lower the recharge threshold and reward consumption.
    LateRecharge = 5,
}

impl Strategy {
    /// Every profile in tag order.
    pub const ALL: [Self; 5] = [
        Self::Distance,
        Self::Risk,
        Self::Balanced,
        Self::EarlyRecharge,
        Self::LateRecharge,
    ];

    /// Numeric tag of the profile.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable profile name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Risk => "risk",
            Self::Balanced => "balanced",
            Self::EarlyRecharge => "early-recharge",
            Self::LateRecharge => "late-recharge",
        }
    }

    /// Offset applied to the configured recharge threshold.
    const fn threshold_offset(self) -> f64 {
        match self {
            Self::EarlyRecharge => 15.0,
            Self::LateRecharge => -10.0,
            Self::Distance | Self::Risk | Self::Balanced => 0.0,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

/// Error returned when parsing a [`Strategy`] tag fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy {tag:?}; expected 1-5 or one of distance, risk, balanced, early-recharge, late-recharge")]
pub struct StrategyParseError {
    /// Rejected input.
    pub tag: String,
}

impl TryFrom<u8> for Strategy {
    type Error = StrategyParseError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.code() == code)
            .ok_or_else(|| StrategyParseError {
                tag: code.to_string(),
            })
    }
}

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::try_from(code);
        }
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| StrategyParseError {
                tag: s.to_owned(),
            })
    }
}

/// Battery limits shared by every solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryConfig {
    /// Full charge, restored at a recharge point.
    pub capacity: f64,
    /// Charge below which recharges are sought, before strategy offsets.
    pub recharge_threshold: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity: 50.0,
            recharge_threshold: 30.0,
        }
    }
}

/// Role of the vertex an edge leads to, as far as ranking is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A delivery not yet made.
    PendingDelivery,
    /// A recharge point.
    Recharge,
    /// Anything else.
    Other,
}

/// Stateless scoring rules for one strategy and battery configuration.
///
/// # Examples
/// ```
/// use skyroute_core::{BatteryConfig, CandidateKind, CostPolicy, EdgeWeight, Strategy};
///
/// let policy = CostPolicy::new(Strategy::EarlyRecharge, &BatteryConfig::default());
/// assert!((policy.recharge_threshold() - 45.0).abs() < f64::EPSILON);
/// let edge = EdgeWeight::new(10.0, 0.0, 5.0);
/// let low = policy.edge_priority(&edge, 40.0, CandidateKind::Recharge);
/// assert!(low < 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostPolicy {
    strategy: Strategy,
    capacity: f64,
    threshold: f64,
}

impl CostPolicy {
    /// Derive the policy for `strategy` under `battery`.
    ///
    /// The strategy offset is applied to the configured threshold and the
    /// result is kept within `[0, capacity]`.
    #[must_use]
    pub fn new(strategy: Strategy, battery: &BatteryConfig) -> Self {
        let threshold = (battery.recharge_threshold + strategy.threshold_offset())
            .max(0.0)
            .min(battery.capacity);
        Self {
            strategy,
            capacity: battery.capacity,
            threshold,
        }
    }

    /// Profile in force.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Full battery charge.
    #[must_use]
    pub const fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Strategy-adjusted recharge threshold.
    #[must_use]
    pub const fn recharge_threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `battery` is low enough to trigger recharging.
    #[must_use]
    pub fn needs_recharge(&self, battery: f64) -> bool {
        battery < self.threshold
    }

    /// Ranking key for an edge; lower is explored first.
    ///
    /// A low battery overrides the strategy blend: recharge targets become
    /// almost free and everything else is penalised. Pending deliveries are
    /// discounted in every case.
    #[must_use]
    pub fn edge_priority(&self, weight: &EdgeWeight, battery: f64, target: CandidateKind) -> f64 {
        let EdgeWeight {
            distance,
            risk,
            consumption,
        } = *weight;
        let base = if self.needs_recharge(battery) {
            if target == CandidateKind::Recharge {
                distance * LOW_BATTERY_RECHARGE_BIAS
            } else {
                distance * LOW_BATTERY_PENALTY
            }
        } else {
            match self.strategy {
                Strategy::Distance => distance,
                Strategy::Risk | Strategy::Balanced => distance + RISK_WEIGHT * risk,
                Strategy::EarlyRecharge => distance + 40.0 * risk + 10.0 * consumption,
                Strategy::LateRecharge => distance + 100.0 * risk - 5.0 * consumption,
            }
        };
        if target == CandidateKind::PendingDelivery {
            base * PENDING_DELIVERY_DISCOUNT
        } else {
            base
        }
    }

    /// Value used by the tree solvers to rank complete routes.
    #[must_use]
    pub fn terminal_value(&self, distance: f64, risk: f64) -> f64 {
        match self.strategy {
            Strategy::Distance => distance,
            Strategy::Risk => risk,
            Strategy::Balanced | Strategy::EarlyRecharge | Strategy::LateRecharge => {
                distance + RISK_WEIGHT * risk
            }
        }
    }

    /// Value used by annealing, which also accounts for recharge stops.
    #[must_use]
    pub fn route_value(&self, distance: f64, risk: f64, recharges: u32) -> f64 {
        let stops = f64::from(recharges);
        match self.strategy {
            Strategy::Distance => distance,
            Strategy::Risk | Strategy::Balanced => distance + RISK_WEIGHT * risk,
            Strategy::EarlyRecharge => distance + 40.0 * risk + 20.0 * stops,
            Strategy::LateRecharge => distance + 100.0 * risk - 10.0 * stops,
        }
    }
}
