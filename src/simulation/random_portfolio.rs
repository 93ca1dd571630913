//! Random portfolio generation for load testing and benchmarks.

use crate::core::debt::Debt;
use crate::core::money::{monthly_interest, round_currency};
use crate::core::portfolio::Portfolio;
use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Shape of a generated portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub debt_count: usize,
    pub min_balance: Decimal,
    pub max_balance: Decimal,
    /// Annual rates are drawn from `[min_rate, max_rate)`, in percent.
    pub min_rate: Decimal,
    pub max_rate: Decimal,
    /// Share of the balance added on top of the first month's interest to
    /// form each minimum payment.
    pub principal_share: Decimal,
    pub extra_payment: Decimal,
    pub start_date: NaiveDate,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            debt_count: 5,
            min_balance: Decimal::from(500),
            max_balance: Decimal::from(25_000),
            min_rate: Decimal::ZERO,
            max_rate: Decimal::from(30),
            principal_share: dec!(0.01),
            extra_payment: Decimal::from(200),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// Draw a uniformly distributed amount in `[min, max)` at cent precision.
fn random_cents<R: Rng>(rng: &mut R, min: Decimal, max: Decimal) -> Decimal {
    let lo = (min * Decimal::ONE_HUNDRED).trunc();
    let hi = (max * Decimal::ONE_HUNDRED).trunc();
    let lo: i64 = lo.try_into().unwrap_or(0);
    let hi: i64 = hi.try_into().unwrap_or(lo);
    if hi <= lo {
        return Decimal::new(lo, 2);
    }
    Decimal::new(rng.gen_range(lo..hi), 2)
}

/// Generate a random portfolio whose every minimum amortizes its debt.
///
/// Debts are named `DEBT-000`, `DEBT-001`, ... so the portfolio always
/// validates.
pub fn generate_random_portfolio(config: &PortfolioConfig) -> Portfolio {
    let mut rng = rand::thread_rng();

    let debts: Vec<Debt> = (0..config.debt_count)
        .filter_map(|i| {
            let balance = random_cents(&mut rng, config.min_balance, config.max_balance);
            let rate = random_cents(&mut rng, config.min_rate, config.max_rate);
            let minimum = round_currency(
                monthly_interest(balance, rate) + balance * config.principal_share,
            )
            .max(Decimal::from(25));
            Debt::new(format!("DEBT-{:03}", i), balance, rate, minimum).ok()
        })
        .collect();

    Portfolio::new(debts, config.extra_payment, config.start_date)
}
