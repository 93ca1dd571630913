use crate::core::error::ValidationError;
use crate::core::portfolio::Portfolio;
use crate::optimization::strategy::StrategyKind;
use crate::simulation::config::SimulationConfig;
use crate::simulation::simulator::{Simulator, StrategyResult};
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What the recommendation optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationGoal {
    #[default]
    MinimizeInterest,
    MinimizeTime,
    /// Lowest total of scheduled plus extra payments applied.
    MinimizePayment,
}

impl OptimizationGoal {
    /// Ranking key for a result under this goal. Lower is better.
    pub fn key(&self, result: &StrategyResult) -> Decimal {
        match self {
            OptimizationGoal::MinimizeInterest => result.total_interest,
            OptimizationGoal::MinimizeTime => Decimal::from(result.total_months),
            OptimizationGoal::MinimizePayment => result.total_paid,
        }
    }
}

impl fmt::Display for OptimizationGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationGoal::MinimizeInterest => write!(f, "minimize interest"),
            OptimizationGoal::MinimizeTime => write!(f, "minimize time"),
            OptimizationGoal::MinimizePayment => write!(f, "minimize payment"),
        }
    }
}

impl FromStr for OptimizationGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "interest" | "minimize_interest" => Ok(OptimizationGoal::MinimizeInterest),
            "time" | "minimize_time" => Ok(OptimizationGoal::MinimizeTime),
            "payment" | "minimize_payment" => Ok(OptimizationGoal::MinimizePayment),
            other => Err(format!("unknown goal '{}'", other)),
        }
    }
}

/// Results of every strategy on one portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub goal: OptimizationGoal,
    pub results: BTreeMap<StrategyKind, StrategyResult>,
}

impl Comparison {
    pub fn result(&self, kind: StrategyKind) -> Option<&StrategyResult> {
        self.results.get(&kind)
    }

    /// Strategies ranked best-first under `goal`.
    ///
    /// Completed runs always rank ahead of failed ones. Equal keys keep
    /// declaration order, so avalanche wins ties.
    pub fn ranking(&self, goal: OptimizationGoal) -> Vec<StrategyKind> {
        let mut ranked: Vec<(&StrategyKind, &StrategyResult)> = self.results.iter().collect();
        ranked.sort_by(|(ka, a), (kb, b)| {
            b.is_complete()
                .cmp(&a.is_complete())
                .then_with(|| goal.key(a).cmp(&goal.key(b)))
                .then_with(|| ka.cmp(kb))
        });
        ranked.into_iter().map(|(k, _)| *k).collect()
    }

    /// Best completed strategy under `goal`, if any strategy completed.
    pub fn best(&self, goal: OptimizationGoal) -> Option<StrategyKind> {
        self.ranking(goal)
            .into_iter()
            .find(|k| self.results[k].is_complete())
    }

    /// Best strategy under the goal the comparison was run with.
    pub fn recommended(&self) -> Option<StrategyKind> {
        self.best(self.goal)
    }

    /// Interest saved by `kind` relative to the worst completed strategy.
    pub fn interest_savings(&self, kind: StrategyKind) -> Option<Decimal> {
        let chosen = self.results.get(&kind).filter(|r| r.is_complete())?;
        let worst = self
            .results
            .values()
            .filter(|r| r.is_complete())
            .map(|r| r.total_interest)
            .max()?;
        Some(worst - chosen.total_interest)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Strategy Comparison ({}) ===", self.goal)?;
        writeln!(
            f,
            "{:<10} {:>8} {:>14} {:>14}  {}",
            "Strategy", "Months", "Interest", "Total Paid", "Status"
        )?;
        for (kind, result) in &self.results {
            writeln!(
                f,
                "{:<10} {:>8} {:>14.2} {:>14.2}  {}",
                kind.to_string(),
                result.total_months,
                result.total_interest,
                result.total_paid,
                result.status
            )?;
        }
        match self.recommended() {
            Some(best) => writeln!(f, "\nRecommended: {}", best)?,
            None => writeln!(f, "\nRecommended: none (no strategy pays off this portfolio)")?,
        }
        Ok(())
    }
}

/// Runs every built-in strategy against the same portfolio.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyComparator {
    config: SimulationConfig,
}

impl StrategyComparator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Simulate avalanche, snowball and hybrid on independent copies of the
    /// portfolio's debts.
    pub fn compare(
        &self,
        portfolio: &Portfolio,
        goal: OptimizationGoal,
    ) -> Result<Comparison, ValidationError> {
        let simulator = Simulator::new(portfolio, self.config)?;
        let results: BTreeMap<StrategyKind, StrategyResult> = StrategyKind::ALL
            .iter()
            .map(|kind| (*kind, simulator.run(*kind)))
            .collect();
        let comparison = Comparison { goal, results };
        info!(
            "compared {} strategies for {}; recommended {:?}",
            comparison.results.len(),
            goal,
            comparison.recommended()
        );
        Ok(comparison)
    }
}
