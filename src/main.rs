//! debt-optimizer CLI
//!
//! Simulate debt payoff strategies from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Compare every strategy on a portfolio
//! debt-optimizer compare --input debts.json
//!
//! # Rank by payoff time and output JSON
//! debt-optimizer compare --input debts.json --goal time --format json
//!
//! # Full month-by-month schedule for one strategy
//! debt-optimizer schedule --input debts.json --strategy snowball
//!
//! # Generate a random portfolio for testing
//! debt-optimizer generate --debts 8 --output debts.json
//! ```
//!
//! Set `RUST_LOG=debug` to trace every simulated month.

use chrono::NaiveDate;
use debt_optimizer::core::cash_flow::CashFlowEntry;
use debt_optimizer::core::debt::Debt;
use debt_optimizer::core::portfolio::Portfolio;
use debt_optimizer::optimization::comparator::{OptimizationGoal, StrategyComparator};
use debt_optimizer::optimization::reserves::MinPaymentReserves;
use debt_optimizer::optimization::strategy::StrategyKind;
use debt_optimizer::optimization::summary::DebtSummary;
use debt_optimizer::simulation::config::SimulationConfig;
use debt_optimizer::simulation::random_portfolio::{generate_random_portfolio, PortfolioConfig};
use debt_optimizer::simulation::simulator::{simulate, StrategyResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::process;
use std::str::FromStr;

fn print_usage() {
    eprintln!(
        r#"debt-optimizer — debt payoff simulation and strategy comparison

USAGE:
    debt-optimizer <COMMAND> [OPTIONS]

COMMANDS:
    compare     Simulate avalanche, snowball and hybrid and recommend one
    schedule    Print the month-by-month schedule of one strategy
    summary     Summarize the debts in a portfolio
    generate    Generate a random portfolio (for testing)
    help        Show this message

OPTIONS (compare, schedule, summary):
    --input <FILE>      Path to JSON portfolio file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (compare):
    --goal <GOAL>       interest (default), time or payment

OPTIONS (schedule):
    --strategy <NAME>   avalanche, snowball or hybrid

OPTIONS (summary):
    --cash <AMOUNT>     Cash on hand; also print the minimum-payment reserve

OPTIONS (generate):
    --debts <N>         Number of debts (default: 5)
    --extra <AMOUNT>    Monthly extra payment (default: 200)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    debt-optimizer compare --input debts.json
    debt-optimizer compare --input debts.json --goal time --format json
    debt-optimizer schedule --input debts.json --strategy hybrid
    debt-optimizer summary --input debts.json --cash 1500
    debt-optimizer generate --debts 8 --output debts.json"#
    );
}

/// JSON schema for an input portfolio.
#[derive(serde::Deserialize)]
struct PortfolioFile {
    debts: Vec<Debt>,
    #[serde(default)]
    incomes: Vec<CashFlowEntry>,
    #[serde(default)]
    expenses: Vec<CashFlowEntry>,
    #[serde(default)]
    extra_payment: Decimal,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    settings: SimulationConfig,
}

/// JSON output schema for one strategy in a comparison.
#[derive(Serialize)]
struct StrategyOutput {
    strategy: String,
    status: String,
    months: u32,
    total_interest: String,
    total_paid: String,
    payoff_date: Option<NaiveDate>,
    payoff_order: Vec<String>,
}

#[derive(Serialize)]
struct ComparisonOutput {
    goal: String,
    recommended: Option<String>,
    strategies: Vec<StrategyOutput>,
}

impl From<&StrategyResult> for StrategyOutput {
    fn from(result: &StrategyResult) -> Self {
        StrategyOutput {
            strategy: result.strategy.to_string(),
            status: result.status.to_string(),
            months: result.total_months,
            total_interest: result.total_interest.to_string(),
            total_paid: result.total_paid.to_string(),
            payoff_date: result.payoff_date(),
            payoff_order: result.payoff_order.clone(),
        }
    }
}

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown format '{}', expected 'text' or 'json'", other)),
        }
    }
}

/// Options shared by the commands that read a portfolio.
struct InputOptions {
    path: String,
    format: OutputFormat,
    goal: OptimizationGoal,
    strategy: Option<StrategyKind>,
    cash: Option<Decimal>,
}

fn required_value(args: &[String], i: usize, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", args[i - 1], what);
        process::exit(1);
    })
}

fn parse_input_options(args: &[String]) -> InputOptions {
    let mut input_path = None;
    let mut format = OutputFormat::default();
    let mut goal = OptimizationGoal::default();
    let mut strategy: Option<StrategyKind> = None;
    let mut cash: Option<Decimal> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(required_value(args, i, "a file path"));
            }
            "--format" => {
                i += 1;
                format = required_value(args, i, "'text' or 'json'")
                    .parse::<OutputFormat>()
                    .unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
            }
            "--goal" => {
                i += 1;
                goal = required_value(args, i, "a goal")
                    .parse::<OptimizationGoal>()
                    .unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
            }
            "--strategy" => {
                i += 1;
                let kind = required_value(args, i, "a strategy name")
                    .parse::<StrategyKind>()
                    .unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
                strategy = Some(kind);
            }
            "--cash" => {
                i += 1;
                let raw = required_value(args, i, "an amount");
                cash = Some(raw.parse::<Decimal>().unwrap_or_else(|e| {
                    eprintln!("Invalid amount '{}': {}", raw, e);
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    InputOptions {
        path,
        format,
        goal,
        strategy,
        cash,
    }
}

fn load_portfolio(path: &str) -> (Portfolio, SimulationConfig) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: PortfolioFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "debts": [
    {{ "name": "Credit Card", "balance": "5000", "annual_rate": "18.99", "minimum_payment": "150" }}
  ],
  "extra_payment": "200",
  "start_date": "2025-01-01"
}}"#
        );
        process::exit(1);
    });

    let start_date = file
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let portfolio = Portfolio {
        debts: file.debts,
        incomes: file.incomes,
        expenses: file.expenses,
        extra_payment: file.extra_payment,
        start_date,
    };
    (portfolio, file.settings)
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        process::exit(1);
    });
    println!("{}", json);
}

fn cmd_compare(args: &[String]) {
    let options = parse_input_options(args);
    let (portfolio, settings) = load_portfolio(&options.path);

    let comparison = StrategyComparator::new(settings)
        .compare(&portfolio, options.goal)
        .unwrap_or_else(|e| {
            eprintln!("Invalid portfolio: {}", e);
            process::exit(1);
        });

    if options.format == OutputFormat::Json {
        let output = ComparisonOutput {
            goal: comparison.goal.to_string(),
            recommended: comparison.recommended().map(|k| k.to_string()),
            strategies: comparison.results.values().map(StrategyOutput::from).collect(),
        };
        print_json(&output);
    } else {
        println!("{}", comparison);
        for result in comparison.results.values() {
            println!("{}", result);
        }
        if let Some(best) = comparison.recommended() {
            if let Some(savings) = comparison.interest_savings(best) {
                println!("Interest saved vs. worst strategy: {:.2}", savings);
            }
        }
    }
}

fn cmd_schedule(args: &[String]) {
    let options = parse_input_options(args);
    let kind = options.strategy.unwrap_or_else(|| {
        eprintln!("Error: --strategy <NAME> is required");
        process::exit(1);
    });
    let (portfolio, settings) = load_portfolio(&options.path);

    let result = simulate(&portfolio, kind, settings).unwrap_or_else(|e| {
        eprintln!("Invalid portfolio: {}", e);
        process::exit(1);
    });

    if options.format == OutputFormat::Json {
        print_json(&result);
        return;
    }

    println!("{}", result);
    println!(
        "{:>5} {:<10} {:<20} {:>12} {:>10} {:>10} {:>12}",
        "Month", "Date", "Debt", "Payment", "Interest", "Principal", "Remaining"
    );
    for record in &result.schedule {
        for entry in &record.entries {
            println!(
                "{:>5} {:<10} {:<20} {:>12.2} {:>10.2} {:>10.2} {:>12.2}{}",
                record.period,
                record.month.format("%Y-%m").to_string(),
                entry.debt,
                entry.payment,
                entry.interest,
                entry.principal,
                entry.remaining_balance,
                if entry.paid_off { "  PAID OFF" } else { "" }
            );
        }
    }
    println!("\nDecisions:");
    for line in &result.decision_log {
        println!("  {}", line);
    }
}

fn cmd_summary(args: &[String]) {
    let options = parse_input_options(args);
    let (portfolio, _) = load_portfolio(&options.path);
    let summary = DebtSummary::from_debts(&portfolio.debts);
    let reserves = options.cash.map(|cash| {
        MinPaymentReserves::for_month(portfolio.start_date, cash, &portfolio.debts, &portfolio.incomes)
    });

    if options.format == OutputFormat::Json {
        #[derive(Serialize)]
        struct SummaryOutput {
            summary: DebtSummary,
            reserves: Option<MinPaymentReserves>,
        }
        print_json(&SummaryOutput { summary, reserves });
    } else {
        println!("{}", summary);
        if let Some(reserves) = reserves {
            println!("{}", reserves);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut debt_count = 5usize;
    let mut extra_payment = Decimal::from(200);
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--debts" => {
                i += 1;
                debt_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--debts requires a number");
                        process::exit(1);
                    });
            }
            "--extra" => {
                i += 1;
                extra_payment = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--extra requires an amount");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(required_value(args, i, "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = PortfolioConfig {
        debt_count,
        extra_payment,
        start_date: chrono::Local::now().date_naive(),
        ..Default::default()
    };
    let portfolio = generate_random_portfolio(&config);

    let json = serde_json::to_string_pretty(&portfolio).unwrap_or_else(|e| {
        eprintln!("Error serializing portfolio: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} debts totalling {} → {}",
            portfolio.debts.len(),
            portfolio.total_balance(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "compare" => cmd_compare(rest),
        "schedule" => cmd_schedule(rest),
        "summary" => cmd_summary(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
