//! Strategy showdown.
//!
//! Runs avalanche, snowball and hybrid on a household budget with recurring
//! income and expenses, then shows where the strategies disagree.

use chrono::NaiveDate;
use debt_optimizer::core::cash_flow::CashFlowEntry;
use debt_optimizer::core::debt::Debt;
use debt_optimizer::core::portfolio::Portfolio;
use debt_optimizer::core::recurrence::Recurrence;
use debt_optimizer::optimization::comparator::{OptimizationGoal, StrategyComparator};
use debt_optimizer::optimization::reserves::MinPaymentReserves;
use debt_optimizer::optimization::summary::DebtSummary;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  debt-optimizer: Strategy Showdown       ║");
    println!("╚══════════════════════════════════════════╝\n");

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let portfolio = Portfolio::new(
        vec![
            Debt::new("Credit Card", dec!(5000), dec!(18.99), dec!(150))
                .unwrap()
                .with_due_day(19)
                .unwrap(),
            Debt::new("Store Card", dec!(800), dec!(24.99), dec!(35))
                .unwrap()
                .with_due_day(7)
                .unwrap(),
            Debt::new("Auto Loan", dec!(15000), dec!(5.5), dec!(350))
                .unwrap()
                .with_due_day(1)
                .unwrap(),
            Debt::new("Medical", dec!(450), dec!(0), dec!(50)).unwrap(),
        ],
        dec!(100),
        start,
    )
    .with_income(
        CashFlowEntry::new("Paycheck", dec!(1850), Recurrence::Biweekly, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap())
            .unwrap(),
    )
    .with_expense(CashFlowEntry::new("Rent", dec!(1600), Recurrence::Monthly, start).unwrap())
    .with_expense(CashFlowEntry::new("Groceries & Utilities", dec!(900), Recurrence::Monthly, start).unwrap())
    .with_expense(
        CashFlowEntry::new("Car Insurance", dec!(600), Recurrence::Semiannual, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
            .unwrap(),
    );

    // --- Portfolio overview ---
    println!("{}", DebtSummary::from_debts(&portfolio.debts));

    let reserves = MinPaymentReserves::for_month(start, dec!(1200), &portfolio.debts, &portfolio.incomes);
    println!("{}", reserves);

    // --- Head-to-head ---
    let comparison = StrategyComparator::default()
        .compare(&portfolio, OptimizationGoal::MinimizeInterest)
        .unwrap();
    println!("{}", comparison);

    for result in comparison.results.values() {
        println!("{}", result);
        for line in result.decision_log.iter().take(4) {
            println!("  {}", line);
        }
        println!();
    }

    for goal in [
        OptimizationGoal::MinimizeInterest,
        OptimizationGoal::MinimizeTime,
        OptimizationGoal::MinimizePayment,
    ] {
        match comparison.best(goal) {
            Some(kind) => println!("Best to {}: {}", goal, kind),
            None => println!("Best to {}: none", goal),
        }
    }
}
