//! The amortization simulator.
//!
//! One run advances a private copy of the portfolio's debts month by month
//! under a single [`AllocationStrategy`]. It records a [`PeriodRecord`] per
//! month and a human-readable decision log, and stops once every balance is
//! zero or the horizon cap is reached.
//!
//! # Period transition
//!
//! 1. Order the active debts with the strategy.
//! 2. Resolve the month's surplus.
//! 3. Cascade the surplus over the ordered debts. Each debt absorbs at most
//!    what remains after its minimum.
//! 4. Re-offer funds freed by minimums that overshoot a final balance to the
//!    next debts in order, within the same month.
//! 5. Apply minimum + extra to every active debt exactly once.
//! 6. Record the month.

use crate::core::debt::Debt;
use crate::core::error::ValidationError;
use crate::core::portfolio::Portfolio;
use crate::optimization::strategy::{cascade, Allocation, AllocationStrategy, StrategyKind};
use crate::simulation::cash_flow::{CashFlowResolver, PeriodSurplus};
use crate::simulation::config::SimulationConfig;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run could not finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// These debts were still not covering their own interest when the
    /// horizon ran out.
    NonAmortizing { debts: Vec<String> },
    /// Every debt was amortizing but the plan needs more than the horizon.
    HorizonExceeded { remaining_balance: Decimal },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NonAmortizing { debts } => {
                write!(f, "non-amortizing debt(s): {}", debts.join(", "))
            }
            FailureReason::HorizonExceeded { remaining_balance } => {
                write!(f, "horizon exceeded with {:.2} still owed", remaining_balance)
            }
        }
    }
}

/// Simulator state. Results only ever carry the terminal states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Running,
    Complete,
    Failed(FailureReason),
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationStatus::Running => write!(f, "RUNNING"),
            SimulationStatus::Complete => write!(f, "COMPLETE"),
            SimulationStatus::Failed(reason) => write!(f, "FAILED ({})", reason),
        }
    }
}

/// One debt's line in a month of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPeriodEntry {
    pub debt: String,
    pub starting_balance: Decimal,
    /// Part of the payment that came from the minimum.
    pub minimum_paid: Decimal,
    /// Part of the payment that came from surplus or rolled-over funds.
    pub extra_paid: Decimal,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    /// Interest the payment did not cover.
    pub unpaid_interest: Decimal,
    pub remaining_balance: Decimal,
    pub paid_off: bool,
}

/// One month of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based month number.
    pub period: u32,
    /// First day of the calendar month.
    pub month: NaiveDate,
    /// Active debts in priority order.
    pub entries: Vec<DebtPeriodEntry>,
    pub cash_flow: PeriodSurplus,
    /// Minimum-payment overshoot re-offered within the month.
    pub freed_funds: Decimal,
    /// Extra applied across all debts.
    pub surplus_used: Decimal,
    /// Available surplus and freed funds no debt could absorb.
    pub surplus_unused: Decimal,
}

impl PeriodRecord {
    pub fn entry(&self, debt: &str) -> Option<&DebtPeriodEntry> {
        self.entries.iter().find(|e| e.debt == debt)
    }

    pub fn total_payment(&self) -> Decimal {
        self.entries.iter().map(|e| e.payment).sum()
    }

    pub fn total_interest_paid(&self) -> Decimal {
        self.entries
            .iter()
            .map(|e| e.interest - e.unpaid_interest)
            .sum()
    }

    pub fn remaining_balance(&self) -> Decimal {
        self.entries.iter().map(|e| e.remaining_balance).sum()
    }
}

/// Everything one strategy run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: StrategyKind,
    pub status: SimulationStatus,
    /// Interest actually paid over the run.
    pub total_interest: Decimal,
    /// Sum of every payment applied.
    pub total_paid: Decimal,
    /// Months simulated. For a complete run, months until the last payoff.
    pub total_months: u32,
    pub schedule: Vec<PeriodRecord>,
    /// Debt names in the order they reached zero.
    pub payoff_order: Vec<String>,
    pub decision_log: Vec<String>,
    /// Sum of monthly cash-flow shortfalls.
    pub total_shortfall: Decimal,
    /// Sum of monthly surplus nobody could absorb.
    pub total_unused: Decimal,
}

impl StrategyResult {
    pub fn is_complete(&self) -> bool {
        self.status == SimulationStatus::Complete
    }

    /// Principal retired on one debt across the whole schedule.
    pub fn principal_paid(&self, debt: &str) -> Decimal {
        self.schedule
            .iter()
            .filter_map(|r| r.entry(debt))
            .map(|e| e.principal)
            .sum()
    }

    /// Interest paid on one debt across the whole schedule.
    pub fn interest_paid(&self, debt: &str) -> Decimal {
        self.schedule
            .iter()
            .filter_map(|r| r.entry(debt))
            .map(|e| e.interest - e.unpaid_interest)
            .sum()
    }

    /// Month number in which `debt` reached zero.
    pub fn payoff_month(&self, debt: &str) -> Option<u32> {
        self.schedule
            .iter()
            .find(|r| r.entry(debt).map(|e| e.paid_off).unwrap_or(false))
            .map(|r| r.period)
    }

    /// Payoff date (first of the payoff month).
    pub fn payoff_date(&self) -> Option<NaiveDate> {
        if !self.is_complete() {
            return None;
        }
        self.schedule.last().map(|r| r.month)
    }
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.strategy)?;
        writeln!(f, "Status:          {}", self.status)?;
        writeln!(f, "Months:          {}", self.total_months)?;
        writeln!(f, "Total Interest:  {:.2}", self.total_interest)?;
        writeln!(f, "Total Paid:      {:.2}", self.total_paid)?;
        if self.total_shortfall > Decimal::ZERO {
            writeln!(f, "Shortfall:       {:.2}", self.total_shortfall)?;
        }
        if !self.payoff_order.is_empty() {
            writeln!(f, "Payoff Order:    {}", self.payoff_order.join(" → "))?;
        }
        Ok(())
    }
}

/// Runs strategies over a validated portfolio.
///
/// Every run works on its own clone of the debts; the portfolio itself is
/// never mutated, so one simulator can run any number of strategies.
#[derive(Debug, Clone)]
pub struct Simulator<'a> {
    portfolio: &'a Portfolio,
    config: SimulationConfig,
}

impl<'a> Simulator<'a> {
    /// Validate inputs. Nothing is simulated if this fails.
    pub fn new(portfolio: &'a Portfolio, config: SimulationConfig) -> Result<Self, ValidationError> {
        portfolio.validate()?;
        config.validate()?;
        Ok(Self { portfolio, config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run one of the built-in strategies.
    pub fn run(&self, kind: StrategyKind) -> StrategyResult {
        let strategy = kind.build(self.config.hybrid);
        self.run_with(strategy.as_ref())
    }

    /// Run any allocation policy to completion or failure.
    pub fn run_with(&self, strategy: &dyn AllocationStrategy) -> StrategyResult {
        let mut run = Run::new(self.portfolio, strategy);
        let mut status = SimulationStatus::Running;

        while status == SimulationStatus::Running {
            if run.debts.iter().all(|d| !d.is_active()) {
                status = SimulationStatus::Complete;
            } else if run.period >= self.config.horizon_months {
                status = SimulationStatus::Failed(run.failure_reason());
            } else {
                run.step();
            }
        }

        match &status {
            SimulationStatus::Failed(reason) => {
                warn!("{} run failed after {} months: {}", strategy.kind(), run.period, reason);
                run.log.push(format!("Plan failed: {}", reason));
            }
            _ => {
                info!(
                    "{} run complete in {} months, interest {:.2}",
                    strategy.kind(),
                    run.period,
                    run.total_interest
                );
                run.log.push(format!("All debts paid off after {} months", run.period));
            }
        }

        StrategyResult {
            strategy: strategy.kind(),
            status,
            total_interest: run.total_interest,
            total_paid: run.total_paid,
            total_months: run.period,
            schedule: run.schedule,
            payoff_order: run.payoff_order,
            decision_log: run.log,
            total_shortfall: run.total_shortfall,
            total_unused: run.total_unused,
        }
    }
}

/// Validate and run a single strategy.
pub fn simulate(
    portfolio: &Portfolio,
    kind: StrategyKind,
    config: SimulationConfig,
) -> Result<StrategyResult, ValidationError> {
    Ok(Simulator::new(portfolio, config)?.run(kind))
}

/// Mutable state of one run in progress.
struct Run<'a> {
    strategy: &'a dyn AllocationStrategy,
    resolver: CashFlowResolver<'a>,
    debts: Vec<Debt>,
    period: u32,
    schedule: Vec<PeriodRecord>,
    payoff_order: Vec<String>,
    log: Vec<String>,
    total_interest: Decimal,
    total_paid: Decimal,
    total_shortfall: Decimal,
    total_unused: Decimal,
}

impl<'a> Run<'a> {
    fn new(portfolio: &'a Portfolio, strategy: &'a dyn AllocationStrategy) -> Self {
        Self {
            strategy,
            resolver: CashFlowResolver::new(portfolio),
            debts: portfolio.debts.clone(),
            period: 0,
            schedule: Vec::new(),
            payoff_order: Vec::new(),
            log: Vec::new(),
            total_interest: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_shortfall: Decimal::ZERO,
            total_unused: Decimal::ZERO,
        }
    }

    fn step(&mut self) {
        let month_number = self.period + 1;
        let (month, _) = self.resolver.period_window(self.period);
        let surplus = self.resolver.surplus_for_period(self.period, &self.debts);

        let plan = self.plan_extras(&surplus);
        self.log_plan(month_number, &surplus, &plan);

        let mut entries = Vec::with_capacity(plan.order.len());
        let mut released = Decimal::ZERO;
        for (idx, extra) in plan.order.iter().zip(&plan.extras) {
            let debt = &mut self.debts[*idx];
            let minimum = debt.minimum_payment();
            let payment = debt.apply_period_payment(minimum, *extra);
            released += payment.freed;

            let minimum_paid = payment.payment.min(minimum);
            entries.push(DebtPeriodEntry {
                debt: debt.name().to_string(),
                starting_balance: payment.starting_balance,
                minimum_paid,
                extra_paid: payment.payment - minimum_paid,
                payment: payment.payment,
                interest: payment.interest,
                principal: payment.principal,
                unpaid_interest: payment.unpaid_interest,
                remaining_balance: payment.new_balance,
                paid_off: payment.paid_off(),
            });

            self.total_interest += payment.interest_paid();
            self.total_paid += payment.payment;
            if payment.paid_off() {
                self.payoff_order.push(debt.name().to_string());
                self.log
                    .push(format!("Month {}: {} paid off", month_number, debt.name()));
            } else if payment.unpaid_interest > Decimal::ZERO {
                self.log.push(format!(
                    "Month {}: {} payment {:.2} does not cover interest {:.2}",
                    month_number,
                    debt.name(),
                    payment.payment,
                    payment.interest
                ));
            }
        }
        // Extras are capped, so only overshooting minimums release funds.
        debug_assert_eq!(released, plan.freed);

        let surplus_used: Decimal = plan.extras.iter().copied().sum();
        self.total_shortfall += surplus.shortfall;
        self.total_unused += plan.unused;

        debug!(
            "{} month {}: available {}, used {}, unused {}",
            self.strategy.kind(),
            month_number,
            surplus.available,
            surplus_used,
            plan.unused
        );

        self.schedule.push(PeriodRecord {
            period: month_number,
            month,
            entries,
            cash_flow: surplus,
            freed_funds: plan.freed,
            surplus_used,
            surplus_unused: plan.unused,
        });
        self.period += 1;
    }

    /// Decide each active debt's extra for this month without touching any
    /// balance.
    fn plan_extras(&self, surplus: &PeriodSurplus) -> PeriodPlan {
        let active: Vec<&Debt> = self.debts.iter().filter(|d| d.is_active()).collect();
        let ordered = self.strategy.order_debts(&active);

        let first = self.strategy.allocate(&ordered, surplus.available);

        // Minimums that overshoot a final balance go back into the pool and
        // are offered to whatever capacity the first cascade left.
        let freed: Decimal = ordered.iter().map(|d| d.minimum_overshoot()).sum();
        let residual: Vec<(&str, Decimal)> = ordered
            .iter()
            .map(|d| (d.name(), d.balance_after_minimum() - first.extra_for(d.name())))
            .collect();
        let rolled = cascade(&residual, freed);

        let order: Vec<usize> = ordered
            .iter()
            .filter_map(|d| self.debts.iter().position(|x| x.name() == d.name()))
            .collect();
        let extras = ordered
            .iter()
            .map(|d| first.extra_for(d.name()) + rolled.extra_for(d.name()))
            .collect();

        PeriodPlan {
            names: ordered.iter().map(|d| d.name().to_string()).collect(),
            order,
            extras,
            freed,
            unused: first.unused + rolled.unused,
            first,
            rolled,
        }
    }

    fn log_plan(&mut self, month_number: u32, surplus: &PeriodSurplus, plan: &PeriodPlan) {
        self.log.push(format!(
            "Month {}: {} order {}; {:.2} available for extra payments",
            month_number,
            self.strategy.kind(),
            plan.names.join(" > "),
            surplus.available
        ));
        if surplus.shortfall > Decimal::ZERO {
            warn!(
                "month {}: cash flow short by {:.2} before minimum payments",
                month_number, surplus.shortfall
            );
            self.log.push(format!(
                "Month {}: cash flow short by {:.2}; minimum payments only",
                month_number, surplus.shortfall
            ));
        }
        for (name, amount) in &plan.first.extras {
            self.log.push(format!(
                "Month {}: {:.2} extra to {}",
                month_number, amount, name
            ));
        }
        for (name, amount) in &plan.rolled.extras {
            self.log.push(format!(
                "Month {}: {:.2} freed by a payoff rolled to {}",
                month_number, amount, name
            ));
        }
        if plan.unused > Decimal::ZERO {
            self.log.push(format!(
                "Month {}: {:.2} left unallocated",
                month_number, plan.unused
            ));
        }
    }

    /// Classify a run that hit the horizon.
    fn failure_reason(&self) -> FailureReason {
        let stalled: Vec<String> = self
            .schedule
            .last()
            .map(|record| {
                record
                    .entries
                    .iter()
                    .filter(|e| e.remaining_balance > Decimal::ZERO && e.principal.is_zero())
                    .map(|e| e.debt.clone())
                    .collect()
            })
            .unwrap_or_default();

        if stalled.is_empty() {
            FailureReason::HorizonExceeded {
                remaining_balance: self.debts.iter().map(|d| d.balance()).sum(),
            }
        } else {
            FailureReason::NonAmortizing { debts: stalled }
        }
    }
}

/// Extras for one month, aligned with the priority order.
struct PeriodPlan {
    names: Vec<String>,
    /// Indices into the run's debts, highest priority first.
    order: Vec<usize>,
    extras: Vec<Decimal>,
    freed: Decimal,
    unused: Decimal,
    first: Allocation,
    rolled: Allocation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cash_flow::CashFlowEntry;
    use crate::core::recurrence::Recurrence;
    use rust_decimal_macros::dec;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn run(debts: Vec<Debt>, extra: Decimal, kind: StrategyKind) -> StrategyResult {
        let portfolio = Portfolio::new(debts, extra, start());
        simulate(&portfolio, kind, SimulationConfig::default()).unwrap()
    }

    #[test]
    fn test_single_period_exact_payoff() {
        // 100.00 at 12% accrues 1.00; the 101.00 minimum clears it exactly.
        let debt = Debt::new("Exact", dec!(100), dec!(12), dec!(101)).unwrap();
        let result = run(vec![debt], Decimal::ZERO, StrategyKind::Avalanche);
        assert!(result.is_complete());
        assert_eq!(result.total_months, 1);
        assert_eq!(result.total_interest, dec!(1.00));
        let record = &result.schedule[0];
        assert_eq!(record.freed_funds, Decimal::ZERO);
        assert_eq!(record.surplus_unused, Decimal::ZERO);
        assert_eq!(record.entries[0].remaining_balance, Decimal::ZERO);
        assert_eq!(result.payoff_order, vec!["Exact"]);
    }

    #[test]
    fn test_overshoot_rolls_within_month() {
        let debts = vec![
            Debt::new("Tail", dec!(20), Decimal::ZERO, dec!(50)).unwrap(),
            Debt::new("Loan", dec!(1000), Decimal::ZERO, dec!(100)).unwrap(),
        ];
        let result = run(debts, Decimal::ZERO, StrategyKind::Snowball);
        let first = &result.schedule[0];
        assert_eq!(first.freed_funds, dec!(30));
        let tail = first.entry("Tail").unwrap();
        assert_eq!(tail.payment, dec!(20));
        assert!(tail.paid_off);
        let loan = first.entry("Loan").unwrap();
        assert_eq!(loan.extra_paid, dec!(30));
        assert_eq!(loan.remaining_balance, dec!(870));
        assert!(result
            .decision_log
            .iter()
            .any(|l| l.contains("30.00 freed by a payoff rolled to Loan")));

        // From month 2 on, the freed 50 minimum funds the loan as extra.
        let second = &result.schedule[1];
        assert_eq!(second.cash_flow.available, dec!(50));
        assert_eq!(second.entry("Loan").unwrap().payment, dec!(150));
        assert!(second.entry("Tail").is_none());
    }

    #[test]
    fn test_non_amortizing_fails_at_horizon() {
        let debt = Debt::new("Payday", dec!(10000), dec!(30), dec!(100)).unwrap();
        let portfolio = Portfolio::new(vec![debt], Decimal::ZERO, start());
        let config = SimulationConfig {
            horizon_months: 24,
            ..Default::default()
        };
        let result = simulate(&portfolio, StrategyKind::Avalanche, config).unwrap();
        assert_eq!(
            result.status,
            SimulationStatus::Failed(FailureReason::NonAmortizing {
                debts: vec!["Payday".into()]
            })
        );
        assert_eq!(result.total_months, 24);
        assert_eq!(result.schedule.len(), 24);
        assert_eq!(result.schedule[23].entries[0].remaining_balance, dec!(10000));
        assert!(result.payoff_order.is_empty());
    }

    #[test]
    fn test_horizon_exceeded() {
        let debt = Debt::new("Slow", dec!(10000), Decimal::ZERO, dec!(100)).unwrap();
        let portfolio = Portfolio::new(vec![debt], Decimal::ZERO, start());
        let config = SimulationConfig {
            horizon_months: 12,
            ..Default::default()
        };
        let result = simulate(&portfolio, StrategyKind::Snowball, config).unwrap();
        assert_eq!(
            result.status,
            SimulationStatus::Failed(FailureReason::HorizonExceeded {
                remaining_balance: dec!(8800)
            })
        );
    }

    #[test]
    fn test_shortfall_still_pays_minimums() {
        let debt = Debt::new("Card", dec!(300), Decimal::ZERO, dec!(100)).unwrap();
        let portfolio = Portfolio::new(vec![debt], Decimal::ZERO, start()).with_income(
            CashFlowEntry::new("Pay", dec!(60), Recurrence::Monthly, start()).unwrap(),
        );
        let result = simulate(&portfolio, StrategyKind::Avalanche, SimulationConfig::default()).unwrap();
        assert!(result.is_complete());
        assert_eq!(result.total_months, 3);
        assert_eq!(result.total_shortfall, dec!(120));
        assert!(result.decision_log.iter().any(|l| l.contains("short by 40.00")));
    }

    #[test]
    fn test_already_paid_portfolio_completes_immediately() {
        let debt = Debt::new("Zero", Decimal::ZERO, dec!(10), dec!(10)).unwrap();
        let result = run(vec![debt], dec!(50), StrategyKind::Hybrid);
        assert!(result.is_complete());
        assert_eq!(result.total_months, 0);
        assert!(result.schedule.is_empty());
    }

    #[test]
    fn test_caller_debts_untouched() {
        let debt = Debt::new("Card", dec!(500), dec!(10), dec!(100)).unwrap();
        let portfolio = Portfolio::new(vec![debt.clone()], Decimal::ZERO, start());
        let simulator = Simulator::new(&portfolio, SimulationConfig::default()).unwrap();
        let first = simulator.run(StrategyKind::Avalanche);
        let second = simulator.run(StrategyKind::Avalanche);
        assert_eq!(portfolio.debts[0], debt);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_portfolio_never_runs() {
        let portfolio = Portfolio::new(Vec::new(), Decimal::ZERO, start());
        assert_eq!(
            simulate(&portfolio, StrategyKind::Avalanche, SimulationConfig::default()).unwrap_err(),
            ValidationError::EmptyDebtSet
        );
    }
}
