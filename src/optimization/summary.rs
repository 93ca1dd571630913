use crate::core::debt::Debt;
use crate::core::money::round_currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a debt portfolio before any simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub debt_count: usize,
    pub total_balance: Decimal,
    pub total_minimum_payment: Decimal,
    /// Balance-weighted average annual rate, in percent.
    pub weighted_average_rate: Decimal,
    /// Interest the portfolio accrues over the next month.
    pub monthly_interest: Decimal,
    pub highest_rate_debt: Option<String>,
    pub smallest_balance_debt: Option<String>,
    /// Debts whose minimum does not cover their own interest.
    pub non_amortizing: Vec<String>,
}

impl DebtSummary {
    /// Summarize the debts still carrying a balance.
    pub fn from_debts(debts: &[Debt]) -> Self {
        let active: Vec<&Debt> = debts.iter().filter(|d| d.is_active()).collect();
        let total_balance: Decimal = active.iter().map(|d| d.balance()).sum();
        let weighted: Decimal = active.iter().map(|d| d.balance() * d.annual_rate()).sum();
        let weighted_average_rate = if total_balance.is_zero() {
            Decimal::ZERO
        } else {
            round_currency(weighted / total_balance)
        };

        // Same tie-breaks as the avalanche and snowball orderings.
        let highest_rate_debt = active
            .iter()
            .min_by(|a, b| {
                b.annual_rate()
                    .cmp(&a.annual_rate())
                    .then_with(|| b.balance().cmp(&a.balance()))
                    .then_with(|| a.name().cmp(b.name()))
            })
            .map(|d| d.name().to_string());
        let smallest_balance_debt = active
            .iter()
            .min_by(|a, b| {
                a.balance()
                    .cmp(&b.balance())
                    .then_with(|| b.annual_rate().cmp(&a.annual_rate()))
                    .then_with(|| a.name().cmp(b.name()))
            })
            .map(|d| d.name().to_string());

        DebtSummary {
            debt_count: active.len(),
            total_balance,
            total_minimum_payment: active.iter().map(|d| d.minimum_payment()).sum(),
            weighted_average_rate,
            monthly_interest: active.iter().map(|d| d.accrued_interest()).sum(),
            highest_rate_debt,
            smallest_balance_debt,
            non_amortizing: active
                .iter()
                .filter(|d| !d.minimum_covers_interest())
                .map(|d| d.name().to_string())
                .collect(),
        }
    }
}

impl fmt::Display for DebtSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Debt Summary ===")?;
        writeln!(f, "Debts:              {}", self.debt_count)?;
        writeln!(f, "Total Balance:      {:.2}", self.total_balance)?;
        writeln!(f, "Total Minimums:     {:.2}", self.total_minimum_payment)?;
        writeln!(f, "Average Rate:       {:.2}%", self.weighted_average_rate)?;
        writeln!(f, "Monthly Interest:   {:.2}", self.monthly_interest)?;
        if let Some(name) = &self.highest_rate_debt {
            writeln!(f, "Highest Rate:       {}", name)?;
        }
        if let Some(name) = &self.smallest_balance_debt {
            writeln!(f, "Smallest Balance:   {}", name)?;
        }
        if !self.non_amortizing.is_empty() {
            writeln!(
                f,
                "\nWarning: minimum payment below interest for {}",
                self.non_amortizing.join(", ")
            )?;
        }
        Ok(())
    }
}
