use chrono::NaiveDate;
use debt_optimizer::core::cash_flow::CashFlowEntry;
use debt_optimizer::core::debt::Debt;
use debt_optimizer::core::error::ValidationError;
use debt_optimizer::core::portfolio::Portfolio;
use debt_optimizer::core::recurrence::Recurrence;
use debt_optimizer::optimization::comparator::{OptimizationGoal, StrategyComparator};
use debt_optimizer::optimization::strategy::StrategyKind;
use debt_optimizer::optimization::summary::DebtSummary;
use debt_optimizer::simulation::cash_flow::CashFlowResolver;
use debt_optimizer::simulation::config::SimulationConfig;
use debt_optimizer::simulation::simulator::{simulate, FailureReason, SimulationStatus, Simulator};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_debts(second_balance: Decimal) -> Portfolio {
    Portfolio::new(
        vec![
            Debt::new("Debt1", dec!(1000), dec!(20), dec!(50)).unwrap(),
            Debt::new("Debt2", second_balance, dec!(5), dec!(50)).unwrap(),
        ],
        dec!(100),
        date(2024, 1, 1),
    )
}

/// A single amortizing loan paid with its minimum only.
#[test]
fn single_loan_minimum_only() {
    let portfolio = Portfolio::new(
        vec![Debt::new("Loan", dec!(1200), dec!(12), dec!(103)).unwrap()],
        Decimal::ZERO,
        date(2024, 1, 1),
    );
    let result = simulate(&portfolio, StrategyKind::Avalanche, SimulationConfig::default()).unwrap();

    assert_eq!(result.status, SimulationStatus::Complete);
    // n = -ln(1 - rP/M) / ln(1 + r) with r = 1%, P = 1200, M = 103 is about
    // 12.45, so the last partial payment lands in month 13.
    assert_eq!(result.total_months, 13);
    assert_eq!(result.total_interest, dec!(82.35));
    assert_eq!(result.total_paid, dec!(1282.35));
    assert_eq!(result.total_paid - result.total_interest, dec!(1200));

    let first = result.schedule[0].entry("Loan").unwrap();
    assert_eq!(first.interest, dec!(12.00));
    assert_eq!(first.principal, dec!(91.00));
    assert_eq!(first.remaining_balance, dec!(1109.00));

    let last = result.schedule.last().unwrap().entry("Loan").unwrap();
    assert_eq!(last.payment, dec!(46.35));
    assert!(last.paid_off);
    assert_eq!(result.payoff_date(), Some(date(2025, 1, 1)));
    assert_eq!(
        result.decision_log.last().map(String::as_str),
        Some("All debts paid off after 13 months")
    );
}

/// Avalanche never pays more interest than snowball on equal balances.
#[test]
fn avalanche_vs_snowball_equal_balances() {
    let comparison = StrategyComparator::default()
        .compare(&two_debts(dec!(1000)), OptimizationGoal::MinimizeInterest)
        .unwrap();
    let avalanche = comparison.result(StrategyKind::Avalanche).unwrap();
    let snowball = comparison.result(StrategyKind::Snowball).unwrap();

    assert!(avalanche.total_interest <= snowball.total_interest);
    assert_eq!(avalanche.payoff_order, vec!["Debt1", "Debt2"]);
    assert_eq!(avalanche.total_months, 11);
    assert_eq!(avalanche.total_interest, dec!(100.68));
    assert_eq!(comparison.recommended(), Some(StrategyKind::Avalanche));

    // Month 1 sends the whole extra to the 20% debt.
    let month_one = &avalanche.schedule[0];
    assert_eq!(month_one.entry("Debt1").unwrap().extra_paid, dec!(100));
    assert_eq!(month_one.entry("Debt2").unwrap().extra_paid, Decimal::ZERO);

    let again = StrategyComparator::default()
        .compare(&two_debts(dec!(1000)), OptimizationGoal::MinimizeInterest)
        .unwrap();
    assert_eq!(again, comparison);
}

/// With a slightly smaller low-rate debt the two orderings diverge.
#[test]
fn avalanche_beats_snowball_when_orders_differ() {
    let comparison = StrategyComparator::default()
        .compare(&two_debts(dec!(999)), OptimizationGoal::MinimizeInterest)
        .unwrap();
    let avalanche = comparison.result(StrategyKind::Avalanche).unwrap();
    let snowball = comparison.result(StrategyKind::Snowball).unwrap();

    assert_eq!(avalanche.payoff_order, vec!["Debt1", "Debt2"]);
    assert_eq!(snowball.payoff_order, vec!["Debt2", "Debt1"]);
    assert_eq!(avalanche.total_interest, dec!(100.62));
    assert_eq!(snowball.total_interest, dec!(149.94));
    assert!(avalanche.total_interest < snowball.total_interest);

    assert_eq!(
        snowball.decision_log[0],
        "Month 1: snowball order Debt2 > Debt1; 100.00 available for extra payments"
    );
    assert_eq!(
        comparison.interest_savings(StrategyKind::Avalanche),
        Some(dec!(49.32))
    );
}

/// A minimum below the monthly interest never retires the debt.
#[test]
fn non_amortizing_debt_fails_at_horizon() {
    let portfolio = Portfolio::new(
        vec![Debt::new("Payday", dec!(10000), dec!(30), dec!(100)).unwrap()],
        Decimal::ZERO,
        date(2024, 1, 1),
    );
    let config = SimulationConfig {
        horizon_months: 24,
        ..Default::default()
    };
    let result = simulate(&portfolio, StrategyKind::Snowball, config).unwrap();

    assert_eq!(
        result.status,
        SimulationStatus::Failed(FailureReason::NonAmortizing {
            debts: vec!["Payday".to_string()]
        })
    );
    assert_eq!(result.total_months, 24);
    assert_eq!(result.total_interest, dec!(2400.00));
    assert!(result
        .schedule
        .iter()
        .all(|r| r.entry("Payday").unwrap().remaining_balance == dec!(10000)));
    assert!(result.decision_log.last().unwrap().starts_with("Plan failed"));
}

/// Recurring budget with a one-time bonus, through every strategy.
#[test]
fn budget_portfolio_pipeline() {
    let portfolio = Portfolio::new(
        vec![
            Debt::new("Card", dec!(3000), dec!(22), dec!(90)).unwrap(),
            Debt::new("Store", dec!(600), dec!(15), dec!(30)).unwrap(),
        ],
        Decimal::ZERO,
        date(2024, 1, 1),
    )
    .with_income(CashFlowEntry::new("Salary", dec!(2500), Recurrence::Monthly, date(2024, 1, 1)).unwrap())
    .with_income(CashFlowEntry::new("Bonus", dec!(1000), Recurrence::OneTime, date(2024, 3, 15)).unwrap())
    .with_expense(CashFlowEntry::new("Rent", dec!(2200), Recurrence::Monthly, date(2024, 1, 1)).unwrap());

    let summary = DebtSummary::from_debts(&portfolio.debts);
    assert_eq!(summary.total_balance, dec!(3600));
    assert_eq!(summary.highest_rate_debt.as_deref(), Some("Card"));
    assert_eq!(summary.smallest_balance_debt.as_deref(), Some("Store"));

    let simulator = Simulator::new(&portfolio, SimulationConfig::default()).unwrap();
    let avalanche = simulator.run(StrategyKind::Avalanche);
    let snowball = simulator.run(StrategyKind::Snowball);
    let hybrid = simulator.run(StrategyKind::Hybrid);

    // 2500 - 2200 - (90 + 30)
    assert_eq!(avalanche.schedule[0].cash_flow.available, dec!(180));
    assert_eq!(avalanche.schedule[2].cash_flow.income, dec!(3500));

    assert_eq!(avalanche.total_months, 10);
    assert_eq!(avalanche.total_interest, dec!(291.12));
    assert_eq!(avalanche.total_paid, dec!(3891.12));
    assert_eq!(avalanche.total_unused, dec!(108.88));
    assert_eq!(avalanche.payoff_order, vec!["Card", "Store"]);

    assert_eq!(snowball.total_interest, dec!(313.51));
    assert_eq!(snowball.payoff_order, vec!["Store", "Card"]);
    // The small 15% balance outweighs the 22% card under default weights.
    assert_eq!(hybrid.payoff_order, snowball.payoff_order);

    for result in [&avalanche, &snowball, &hybrid] {
        assert!(result.is_complete());
        assert_eq!(result.principal_paid("Card"), dec!(3000));
        assert_eq!(result.principal_paid("Store"), dec!(600));
        assert_eq!(result.total_shortfall, Decimal::ZERO);
    }
}

/// Periods are calendar months, so the day of the start date does not move
/// a custom-interval income between periods.
#[test]
fn custom_interval_surplus_ignores_start_day() {
    let budget = |start: NaiveDate| {
        Portfolio::new(
            vec![Debt::new("Card", dec!(2000), dec!(18), dec!(60)).unwrap()],
            Decimal::ZERO,
            start,
        )
        .with_income(CashFlowEntry::new("Gig", dec!(400), Recurrence::CustomDays(10), date(2024, 1, 3)).unwrap())
        .with_expense(CashFlowEntry::new("Rent", dec!(900), Recurrence::Monthly, date(2024, 1, 1)).unwrap())
    };
    let early = budget(date(2024, 1, 1));
    let late = budget(date(2024, 1, 20));
    let early_resolver = CashFlowResolver::new(&early);
    let late_resolver = CashFlowResolver::new(&late);

    for period in 0..8 {
        assert_eq!(early_resolver.period_window(period), late_resolver.period_window(period));
        assert_eq!(
            early_resolver.surplus_for_period(period, &early.debts),
            late_resolver.surplus_for_period(period, &late.debts),
            "period {}",
            period
        );
    }

    // Jan 3, 13, 23: 1200 - 900 - 60
    assert_eq!(late_resolver.surplus_for_period(0, &late.debts).available, dec!(240));
    // July has four paydays: the 1st, 11th, 21st and 31st.
    let july = late_resolver.surplus_for_period(6, &late.debts);
    assert_eq!(july.income, dec!(1600));
    assert_eq!(july.available, dec!(640));
}

/// Portfolio JSON in, comparison JSON out.
#[test]
fn json_round_trip_through_comparator() {
    let json = r#"{
        "debts": [
            {"name": "Visa", "balance": "2500.00", "annual_rate": "24.99", "minimum_payment": "75", "due_day": 19},
            {"name": "Student Loan", "balance": "8000", "annual_rate": "4.5", "minimum_payment": "120"}
        ],
        "incomes": [
            {"name": "Paycheck", "amount": "1800", "recurrence": "biweekly", "start_date": "2024-01-05"}
        ],
        "expenses": [
            {"name": "Living", "amount": "3000", "recurrence": "monthly", "start_date": "2024-01-01"}
        ],
        "extra_payment": "50",
        "start_date": "2024-01-01"
    }"#;
    let portfolio: Portfolio = serde_json::from_str(json).unwrap();
    assert!(portfolio.has_budget());

    let comparison = StrategyComparator::default()
        .compare(&portfolio, OptimizationGoal::MinimizeTime)
        .unwrap();
    assert!(comparison.results.values().all(|r| r.is_complete()));

    let out = serde_json::to_string(&comparison).unwrap();
    let back: debt_optimizer::optimization::comparator::Comparison = serde_json::from_str(&out).unwrap();
    assert_eq!(back, comparison);
}

#[test]
fn invalid_debt_rejected_on_deserialize() {
    let json = r#"{"debts": [{"name": "Bad", "balance": "-1", "annual_rate": "5", "minimum_payment": "10"}], "start_date": "2024-01-01"}"#;
    let err = serde_json::from_str::<Portfolio>(json).unwrap_err();
    assert!(err.to_string().contains("Bad"));
}

#[test]
fn oversized_balance_rejected_on_deserialize() {
    let json = r#"{"debts": [{"name": "Huge", "balance": "79228162514264337593543950335", "annual_rate": "100", "minimum_payment": "10"}], "start_date": "2024-01-01"}"#;
    let err = serde_json::from_str::<Portfolio>(json).unwrap_err();
    assert!(err.to_string().contains("exceeds the supported maximum"));
}

#[test]
fn duplicate_names_abort_before_simulation() {
    let portfolio = Portfolio::new(
        vec![
            Debt::new("Card", dec!(100), dec!(10), dec!(25)).unwrap(),
            Debt::new("Card", dec!(200), dec!(10), dec!(25)).unwrap(),
        ],
        Decimal::ZERO,
        date(2024, 1, 1),
    );
    assert_eq!(
        simulate(&portfolio, StrategyKind::Hybrid, SimulationConfig::default()).unwrap_err(),
        ValidationError::DuplicateDebtName("Card".into())
    );
}
