//! # debt-optimizer
//!
//! Debt repayment simulator and payoff strategy comparator.
//!
//! Given a set of debts, an optional recurring budget and a monthly extra
//! payment, this crate simulates month-by-month amortization under the
//! avalanche, snowball and hybrid allocation strategies and recommends one.
//!
//! ## Architecture
//!
//! - **core**: debts, cash-flow entries, recurrence rules and the portfolio
//! - **optimization**: allocation strategies, comparison, reserves and summaries
//! - **simulation**: cash-flow resolution, the period simulator, random portfolios

pub mod core;
pub mod optimization;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::cash_flow::{CashFlowEntry, ExpenseEntry, IncomeEntry};
    pub use crate::core::debt::Debt;
    pub use crate::core::error::ValidationError;
    pub use crate::core::portfolio::Portfolio;
    pub use crate::core::recurrence::Recurrence;
    pub use crate::optimization::comparator::{Comparison, OptimizationGoal, StrategyComparator};
    pub use crate::optimization::strategy::{AllocationStrategy, HybridWeights, StrategyKind};
    pub use crate::optimization::summary::DebtSummary;
    pub use crate::simulation::config::SimulationConfig;
    pub use crate::simulation::simulator::{simulate, SimulationStatus, Simulator, StrategyResult};
}
