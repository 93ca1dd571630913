use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed input detected before a simulation starts.
///
/// A simulation never begins with invalid input; every constructor and
/// entry point that accepts caller data returns this error instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("debt name must not be empty")]
    EmptyDebtName,
    #[error("debt '{name}' has negative balance {balance}")]
    NegativeBalance { name: String, balance: Decimal },
    #[error("debt '{name}' balance {balance} exceeds the supported maximum")]
    BalanceTooLarge { name: String, balance: Decimal },
    #[error("amount {amount} for '{name}' exceeds the supported maximum")]
    AmountTooLarge { name: String, amount: Decimal },
    #[error("debt '{name}' has annual rate {rate}% outside [0, 100]")]
    RateOutOfRange { name: String, rate: Decimal },
    #[error("debt '{name}' must have a positive minimum payment, got {minimum}")]
    NonPositiveMinimum { name: String, minimum: Decimal },
    #[error("debt '{name}' has due day {day}, expected 1..=31")]
    InvalidDueDay { name: String, day: u32 },
    #[error("at least one debt is required")]
    EmptyDebtSet,
    #[error("debt name '{0}' appears more than once")]
    DuplicateDebtName(String),
    #[error("extra payment must not be negative, got {0}")]
    NegativeExtraPayment(Decimal),
    #[error("cash-flow entry name must not be empty")]
    EmptyEntryName,
    #[error("cash-flow entry '{name}' has negative amount {amount}")]
    NegativeEntryAmount { name: String, amount: Decimal },
    #[error("cash-flow entry '{name}' ends before it starts")]
    EndBeforeStart { name: String },
    #[error("custom recurrence interval must be at least one day")]
    ZeroCustomInterval,
    #[error("hybrid weights must be non-negative and not both zero")]
    InvalidHybridWeights,
    #[error("simulation horizon must be at least one month")]
    ZeroHorizon,
}
