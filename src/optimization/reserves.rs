//! Minimum-payment reservation.
//!
//! Before cash on hand is spent on extra payments, enough of it must be held
//! back to meet upcoming minimums that incoming paychecks will not cover in
//! time.

use crate::core::cash_flow::CashFlowEntry;
use crate::core::debt::Debt;
use crate::core::recurrence::{day_in_month, first_of_month};
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Money expected to arrive on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledIncome {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// A minimum payment due on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentObligation {
    pub debt: String,
    pub due_date: NaiveDate,
    pub minimum: Decimal,
}

/// How much cash on hand must be held back for upcoming minimums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinPaymentReserves {
    pub cash_on_hand: Decimal,
    pub total_reserve: Decimal,
    pub per_obligation: BTreeMap<String, Decimal>,
    /// Cash left for extra payments after the reserve.
    pub available_for_extra: Decimal,
    /// Reserve the cash on hand cannot cover.
    pub shortfall: Decimal,
}

impl MinPaymentReserves {
    /// Reserve against `obligations`, letting income arrive in time to help.
    ///
    /// Obligations are met in due-date order. Income dated after `now` and on
    /// or before a due date goes into a pool that covers that obligation
    /// first. Whatever the pool cannot cover is reserved from cash on hand.
    /// Income arriving on the due date itself counts as available.
    pub fn compute(
        now: NaiveDate,
        cash_on_hand: Decimal,
        incomes: &[ScheduledIncome],
        obligations: &[PaymentObligation],
    ) -> Self {
        let mut incomes: Vec<&ScheduledIncome> = incomes.iter().filter(|i| i.date > now).collect();
        incomes.sort_by_key(|i| i.date);
        let mut obligations: Vec<&PaymentObligation> = obligations.iter().collect();
        obligations.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.debt.cmp(&b.debt)));

        let mut pending = incomes.into_iter().peekable();
        let mut pool = Decimal::ZERO;
        let mut per_obligation: BTreeMap<String, Decimal> = BTreeMap::new();

        for obligation in obligations {
            while let Some(income) = pending.next_if(|i| i.date <= obligation.due_date) {
                pool += income.amount;
            }
            let covered = pool.min(obligation.minimum);
            pool -= covered;
            *per_obligation
                .entry(obligation.debt.clone())
                .or_insert(Decimal::ZERO) += obligation.minimum - covered;
        }

        let total_reserve: Decimal = per_obligation.values().copied().sum();
        Self {
            cash_on_hand,
            total_reserve,
            per_obligation,
            available_for_extra: (cash_on_hand - total_reserve).max(Decimal::ZERO),
            shortfall: (total_reserve - cash_on_hand).max(Decimal::ZERO),
        }
    }

    /// Reserve for the rest of the calendar month containing `now`.
    ///
    /// Each active debt with a due day contributes its minimum if that day
    /// falls on or after `now`. Debts without a due day are skipped. Income
    /// entries contribute their occurrences after `now` through month end.
    pub fn for_month(
        now: NaiveDate,
        cash_on_hand: Decimal,
        debts: &[Debt],
        incomes: &[CashFlowEntry],
    ) -> Self {
        let month = first_of_month(now);
        let next_month = month.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);

        let obligations: Vec<PaymentObligation> = debts
            .iter()
            .filter(|d| d.is_active())
            .filter_map(|d| {
                let due_date = day_in_month(month, d.due_day()?);
                (due_date >= now).then(|| PaymentObligation {
                    debt: d.name().to_string(),
                    due_date,
                    minimum: d.minimum_payment(),
                })
            })
            .collect();

        let after_now = now.checked_add_days(Days::new(1)).unwrap_or(now);
        let scheduled: Vec<ScheduledIncome> = incomes
            .iter()
            .flat_map(|entry| {
                entry
                    .occurrences_between(after_now, next_month)
                    .into_iter()
                    .map(|date| ScheduledIncome {
                        date,
                        amount: entry.amount(),
                    })
            })
            .collect();

        Self::compute(now, cash_on_hand, &scheduled, &obligations)
    }
}

impl fmt::Display for MinPaymentReserves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Minimum Payment Reserve ===")?;
        writeln!(f, "Cash on Hand:        {:.2}", self.cash_on_hand)?;
        writeln!(f, "Total Reserve:       {:.2}", self.total_reserve)?;
        writeln!(f, "Available for Extra: {:.2}", self.available_for_extra)?;
        if self.shortfall > Decimal::ZERO {
            writeln!(f, "Shortfall:           {:.2}", self.shortfall)?;
        }
        for (debt, reserve) in &self.per_obligation {
            writeln!(f, "  {:<20} {:>10.2}", debt, reserve)?;
        }
        Ok(())
    }
}
