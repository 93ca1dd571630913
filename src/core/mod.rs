//! Foundational types: debts, cash-flow entries, recurrence rules, portfolios
//! and money helpers.

pub mod cash_flow;
pub mod debt;
pub mod error;
pub mod money;
pub mod portfolio;
pub mod recurrence;
