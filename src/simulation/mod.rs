//! The month-by-month amortization engine and its inputs.

pub mod cash_flow;
pub mod config;
pub mod random_portfolio;
pub mod simulator;
