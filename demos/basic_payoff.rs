//! Basic payoff example.
//!
//! Simulates one loan paid at its minimum, then the same loan with an extra
//! monthly payment, and prints the difference.

use chrono::NaiveDate;
use debt_optimizer::core::debt::Debt;
use debt_optimizer::core::portfolio::Portfolio;
use debt_optimizer::optimization::strategy::StrategyKind;
use debt_optimizer::simulation::config::SimulationConfig;
use debt_optimizer::simulation::simulator::simulate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  debt-optimizer: Basic Payoff Example    ║");
    println!("╚══════════════════════════════════════════╝\n");

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let loan = Debt::new("Personal Loan", dec!(1200), dec!(12), dec!(103)).unwrap();

    // --- Scenario 1: Minimum payment only ---
    println!("━━━ Scenario 1: Minimum Payment Only ━━━\n");

    let minimum_only = Portfolio::new(vec![loan.clone()], Decimal::ZERO, start);
    let baseline = simulate(&minimum_only, StrategyKind::Avalanche, SimulationConfig::default()).unwrap();

    println!("{}", baseline);
    println!("{:>5} {:>10} {:>10} {:>10} {:>12}", "Month", "Payment", "Interest", "Principal", "Remaining");
    for record in &baseline.schedule {
        let entry = record.entry("Personal Loan").unwrap();
        println!(
            "{:>5} {:>10.2} {:>10.2} {:>10.2} {:>12.2}",
            record.period, entry.payment, entry.interest, entry.principal, entry.remaining_balance
        );
    }
    println!();

    // --- Scenario 2: With an extra $50/month ---
    println!("━━━ Scenario 2: With $50 Extra Per Month ━━━\n");

    let with_extra = Portfolio::new(vec![loan], dec!(50), start);
    let faster = simulate(&with_extra, StrategyKind::Avalanche, SimulationConfig::default()).unwrap();

    println!("{}", faster);
    println!(
        "Paying $50 more each month saves {} months and ${:.2} in interest.",
        baseline.total_months - faster.total_months,
        baseline.total_interest - faster.total_interest
    );
}
