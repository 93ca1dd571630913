use crate::core::debt::Debt;
use crate::core::error::ValidationError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The repayment policies the engine knows how to simulate.
///
/// The declaration order is the tie-break order used when ranking results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Avalanche,
    Snowball,
    Hybrid,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Avalanche,
        StrategyKind::Snowball,
        StrategyKind::Hybrid,
    ];

    /// Instantiate the allocation policy for this kind.
    pub fn build(self, weights: HybridWeights) -> Box<dyn AllocationStrategy> {
        match self {
            StrategyKind::Avalanche => Box::new(Avalanche),
            StrategyKind::Snowball => Box::new(Snowball),
            StrategyKind::Hybrid => Box::new(Hybrid::new(weights)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Avalanche => write!(f, "avalanche"),
            StrategyKind::Snowball => write!(f, "snowball"),
            StrategyKind::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avalanche" => Ok(StrategyKind::Avalanche),
            "snowball" => Ok(StrategyKind::Snowball),
            "hybrid" => Ok(StrategyKind::Hybrid),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// How extra funds were split across debts in one cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Extra amount per debt, in priority order. Debts receiving nothing are omitted.
    pub extras: Vec<(String, Decimal)>,
    /// Funds left once every debt was covered.
    pub unused: Decimal,
}

impl Allocation {
    pub fn extra_for(&self, name: &str) -> Decimal {
        self.extras
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, amount)| *amount)
            .sum()
    }

    pub fn total(&self) -> Decimal {
        self.extras.iter().map(|(_, amount)| *amount).sum()
    }
}

/// Walk `targets` in order, giving each `min(remaining, capacity)`.
///
/// Shared by every strategy: the variants differ only in how they order
/// debts.
///
/// # Examples
///
/// ```
/// use debt_optimizer::optimization::strategy::cascade;
/// use rust_decimal_macros::dec;
///
/// let alloc = cascade(&[("A", dec!(60)), ("B", dec!(500))], dec!(100));
/// assert_eq!(alloc.extra_for("A"), dec!(60));
/// assert_eq!(alloc.extra_for("B"), dec!(40));
/// assert_eq!(alloc.unused, dec!(0));
/// ```
pub fn cascade(targets: &[(&str, Decimal)], available: Decimal) -> Allocation {
    let mut remaining = available.max(Decimal::ZERO);
    let mut extras = Vec::new();
    for (name, capacity) in targets {
        if remaining <= Decimal::ZERO {
            break;
        }
        let amount = remaining.min((*capacity).max(Decimal::ZERO));
        if amount > Decimal::ZERO {
            extras.push((name.to_string(), amount));
            remaining -= amount;
        }
    }
    Allocation {
        extras,
        unused: remaining,
    }
}

/// An ordering policy for extra debt payments.
pub trait AllocationStrategy {
    fn kind(&self) -> StrategyKind;

    /// Priority order over the debts still carrying a balance.
    ///
    /// Implementations must produce a total order so runs are reproducible.
    fn order_debts<'a>(&self, active: &[&'a Debt]) -> Vec<&'a Debt>;

    /// Split `available` across `ordered` debts, highest priority first.
    ///
    /// Each debt absorbs at most what remains after its minimum payment this
    /// period.
    fn allocate(&self, ordered: &[&Debt], available: Decimal) -> Allocation {
        let targets: Vec<(&str, Decimal)> = ordered
            .iter()
            .map(|d| (d.name(), d.balance_after_minimum()))
            .collect();
        cascade(&targets, available)
    }
}

fn active_only<'a>(debts: &[&'a Debt]) -> Vec<&'a Debt> {
    debts.iter().copied().filter(|d| d.is_active()).collect()
}

/// Highest rate first; larger balance, then name, break ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Avalanche;

impl AllocationStrategy for Avalanche {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Avalanche
    }

    fn order_debts<'a>(&self, active: &[&'a Debt]) -> Vec<&'a Debt> {
        let mut ordered = active_only(active);
        ordered.sort_by(|a, b| {
            b.annual_rate()
                .cmp(&a.annual_rate())
                .then_with(|| b.balance().cmp(&a.balance()))
                .then_with(|| a.name().cmp(b.name()))
        });
        ordered
    }
}

/// Smallest balance first; higher rate, then name, break ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct Snowball;

impl AllocationStrategy for Snowball {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Snowball
    }

    fn order_debts<'a>(&self, active: &[&'a Debt]) -> Vec<&'a Debt> {
        let mut ordered = active_only(active);
        ordered.sort_by(|a, b| {
            a.balance()
                .cmp(&b.balance())
                .then_with(|| b.annual_rate().cmp(&a.annual_rate()))
                .then_with(|| a.name().cmp(b.name()))
        });
        ordered
    }
}

/// Relative weights of the two hybrid score terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub rate_weight: Decimal,
    pub balance_weight: Decimal,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            rate_weight: dec!(0.6),
            balance_weight: dec!(0.4),
        }
    }
}

impl HybridWeights {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rate_weight < Decimal::ZERO
            || self.balance_weight < Decimal::ZERO
            || (self.rate_weight + self.balance_weight).is_zero()
        {
            return Err(ValidationError::InvalidHybridWeights);
        }
        Ok(())
    }
}

/// Blend of rate and smallness.
///
/// Each debt scores
/// `rate_weight * rate / max_rate + balance_weight * min_balance / balance`
/// over the active set. Both terms fall in `[0, 1]`, so the weights are
/// directly comparable. Small, high-rate debts score highest. Ties break
/// on name.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hybrid {
    weights: HybridWeights,
}

impl Hybrid {
    pub fn new(weights: HybridWeights) -> Self {
        Self { weights }
    }

    /// Score every active debt. Higher means pay first.
    pub fn scores<'a>(&self, active: &[&'a Debt]) -> Vec<(&'a Debt, Decimal)> {
        let active = active_only(active);
        let max_rate = active
            .iter()
            .map(|d| d.annual_rate())
            .max()
            .unwrap_or(Decimal::ZERO);
        let min_balance = active
            .iter()
            .map(|d| d.balance())
            .min()
            .unwrap_or(Decimal::ZERO);

        active
            .into_iter()
            .map(|d| {
                let rate_term = if max_rate.is_zero() {
                    Decimal::ZERO
                } else {
                    d.annual_rate() / max_rate
                };
                let balance_term = min_balance / d.balance();
                let score =
                    self.weights.rate_weight * rate_term + self.weights.balance_weight * balance_term;
                (d, score)
            })
            .collect()
    }
}

impl AllocationStrategy for Hybrid {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hybrid
    }

    fn order_debts<'a>(&self, active: &[&'a Debt]) -> Vec<&'a Debt> {
        let mut scored = self.scores(active);
        scored.sort_by(|(a, sa), (b, sb)| match sb.cmp(sa) {
            Ordering::Equal => a.name().cmp(b.name()),
            other => other,
        });
        scored.into_iter().map(|(d, _)| d).collect()
    }
}
