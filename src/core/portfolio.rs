use crate::core::cash_flow::CashFlowEntry;
use crate::core::debt::Debt;
use crate::core::error::ValidationError;
use crate::core::money::MAX_AMOUNT;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything a simulation run needs from the caller.
///
/// A portfolio is plain data. [`Portfolio::validate`] checks the
/// cross-record rules (non-empty, unique names, non-negative extra) that
/// single-record constructors cannot see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub incomes: Vec<CashFlowEntry>,
    #[serde(default)]
    pub expenses: Vec<CashFlowEntry>,
    /// Flat amount added to the surplus every month.
    #[serde(default)]
    pub extra_payment: Decimal,
    /// Any date in the first simulated month.
    pub start_date: NaiveDate,
}

impl Portfolio {
    /// A portfolio with no modelled income or expenses.
    pub fn new(debts: Vec<Debt>, extra_payment: Decimal, start_date: NaiveDate) -> Self {
        Self {
            debts,
            incomes: Vec::new(),
            expenses: Vec::new(),
            extra_payment,
            start_date,
        }
    }

    pub fn with_income(mut self, entry: CashFlowEntry) -> Self {
        self.incomes.push(entry);
        self
    }

    pub fn with_expense(mut self, entry: CashFlowEntry) -> Self {
        self.expenses.push(entry);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.debts.is_empty() {
            return Err(ValidationError::EmptyDebtSet);
        }
        let mut seen = BTreeSet::new();
        for debt in &self.debts {
            if !seen.insert(debt.name()) {
                return Err(ValidationError::DuplicateDebtName(debt.name().to_string()));
            }
        }
        if self.extra_payment < Decimal::ZERO {
            return Err(ValidationError::NegativeExtraPayment(self.extra_payment));
        }
        if self.extra_payment > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge {
                name: "extra payment".to_string(),
                amount: self.extra_payment,
            });
        }
        Ok(())
    }

    /// Whether any income or expense is modelled.
    pub fn has_budget(&self) -> bool {
        !self.incomes.is_empty() || !self.expenses.is_empty()
    }

    pub fn total_balance(&self) -> Decimal {
        self.debts.iter().map(|d| d.balance()).sum()
    }
}
