use crate::core::cash_flow::CashFlowEntry;
use crate::core::debt::Debt;
use crate::core::portfolio::Portfolio;
use crate::core::recurrence::first_of_month;
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash-flow breakdown for one simulated month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodSurplus {
    /// Income firing this month. Without a modelled budget this is the sum
    /// of the initial minimum payments.
    pub income: Decimal,
    pub expenses: Decimal,
    /// Minimum payments of debts still outstanding at the start of the month.
    pub minimums: Decimal,
    /// Flat extra payment from the portfolio.
    pub extra_payment: Decimal,
    /// Funds available for extra payments (never negative).
    pub available: Decimal,
    /// How far the month fell short of funding its minimums.
    pub shortfall: Decimal,
}

impl PeriodSurplus {
    /// Signed surplus before clamping.
    pub fn net(&self) -> Decimal {
        self.income - self.expenses - self.minimums + self.extra_payment
    }
}

/// Resolves income and expense schedules into a monthly surplus.
///
/// Period `i` is the calendar month `i` months after the month containing
/// the portfolio's start date. When the portfolio carries no income or
/// expense entries the budget is not modelled. The resolver then treats the
/// initial minimum payments as a fixed monthly budget, so each payoff frees
/// its minimum into the surplus of later months.
#[derive(Debug, Clone)]
pub struct CashFlowResolver<'a> {
    incomes: &'a [CashFlowEntry],
    expenses: &'a [CashFlowEntry],
    extra_payment: Decimal,
    first_month: NaiveDate,
    implicit_income: Option<Decimal>,
}

impl<'a> CashFlowResolver<'a> {
    pub fn new(portfolio: &'a Portfolio) -> Self {
        let implicit_income = if portfolio.has_budget() {
            None
        } else {
            Some(
                portfolio
                    .debts
                    .iter()
                    .filter(|d| d.is_active())
                    .map(|d| d.minimum_payment())
                    .sum(),
            )
        };
        Self {
            incomes: &portfolio.incomes,
            expenses: &portfolio.expenses,
            extra_payment: portfolio.extra_payment,
            first_month: first_of_month(portfolio.start_date),
            implicit_income,
        }
    }

    /// `[first day, first day of next month)` for period `period_index`.
    pub fn period_window(&self, period_index: u32) -> (NaiveDate, NaiveDate) {
        let from = self
            .first_month
            .checked_add_months(Months::new(period_index))
            .unwrap_or(NaiveDate::MAX);
        let until = from
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        (from, until)
    }

    /// Income minus expenses minus outstanding minimums plus the flat extra.
    ///
    /// A negative result becomes `available = 0` and a reported `shortfall`.
    /// Minimum payments are still made in full that month.
    pub fn surplus_for_period(&self, period_index: u32, debts: &[Debt]) -> PeriodSurplus {
        let (from, until) = self.period_window(period_index);
        let income = match self.implicit_income {
            Some(budget) => budget,
            None => sum_between(self.incomes, from, until),
        };
        let expenses = sum_between(self.expenses, from, until);
        let minimums: Decimal = debts
            .iter()
            .filter(|d| d.is_active())
            .map(|d| d.minimum_payment())
            .sum();

        let mut surplus = PeriodSurplus {
            income,
            expenses,
            minimums,
            extra_payment: self.extra_payment,
            ..Default::default()
        };
        let net = surplus.net();
        surplus.available = net.max(Decimal::ZERO);
        surplus.shortfall = (-net).max(Decimal::ZERO);
        surplus
    }
}

fn sum_between(entries: &[CashFlowEntry], from: NaiveDate, until: NaiveDate) -> Decimal {
    entries.iter().map(|e| e.total_between(from, until)).sum()
}
