use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use timber_cli::{init_tracing, parse_payoff_debts};
use timber_core::models::{ExportFormat, PayoffStrategy};
use timber_processing::{export_plan, generate_payoff_plan, PayoffOptions};

#[derive(Parser, Debug)]
#[command(name = "timber-payoff")]
#[command(about = "Print a debt payoff schedule without a server")]
struct Args {
    /// JSON file with an array of {creditor, balance, apr, minimumPayment}
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Total monthly amount put towards debt
    #[arg(long)]
    budget: Decimal,

    /// avalanche or snowball
    #[arg(long, default_value = "avalanche")]
    strategy: PayoffStrategy,

    /// csv, html or json
    #[arg(long, default_value = "csv")]
    format: ExportFormat,

    /// First payment month (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    start_date: Option<NaiveDate>,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let debts = parse_payoff_debts(&raw)?;

    let today = chrono::Utc::now().date_naive();
    let plan = generate_payoff_plan(
        &debts,
        PayoffOptions {
            strategy: args.strategy,
            monthly_budget: args.budget,
            start_date: args.start_date.unwrap_or(today),
        },
    )?;

    tracing::info!(
        strategy = %plan.strategy,
        total_months = plan.total_months,
        total_interest = %plan.total_interest,
        debt_free = %plan.debt_free_date,
        "Payoff plan generated"
    );

    let export = export_plan(&plan, args.format, today)?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, export.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", export.body),
    }

    Ok(())
}
