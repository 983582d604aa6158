//! Pennyplan projection runner
//!
//! Loads an account snapshot, projects the configured planning horizon and
//! prints month-end balances with a summary of income and deductions.

use std::path::Path;
use std::process::ExitCode;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pennyplan_core::planning::{
    Account, PlanningData, PlanningSummary, ProjectionCache, ProjectionInput, RatesTable, horizon,
};
use pennyplan_shared::types::Money;
use pennyplan_shared::{AppConfig, AppError, AppResult};

/// Accounts exported from the budgeting store.
#[derive(Debug, Deserialize)]
struct Snapshot {
    accounts: Vec<Account>,
}

fn load_snapshot(path: &Path) -> AppResult<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| AppError::Snapshot(format!("{}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Snapshot(format!("{}: {err}", path.display())))
}

fn format_balance(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| Money::from_minor(value).to_string())
}

fn print_rows(rows: &[PlanningData]) {
    for row in rows {
        let marker = if row.is_current_month { "*" } else { " " };
        let balances: Vec<String> = row
            .accounts
            .iter()
            .map(|account| {
                format!(
                    "{}={}",
                    account.account_name,
                    format_balance(account.end_value.computed_value)
                )
            })
            .collect();
        println!("{marker}{}-{:02}  {}", row.year, row.month, balances.join("  "));
    }
}

fn print_summary(summary: &PlanningSummary) {
    println!();
    println!("Gross income   {}", Money::from_minor(summary.gross_income));
    println!("Income tax     {}", Money::from_minor(summary.income_tax));
    println!("NI             {}", Money::from_minor(summary.ni));
    println!("Student loan   {}", Money::from_minor(summary.student_loan));
    println!("Pension        {}", Money::from_minor(summary.pension));
    println!("Tax relief     {}", Money::from_minor(summary.tax_relief));
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let snapshot = load_snapshot(&config.planning.snapshot_path)?;
    info!(
        path = %config.planning.snapshot_path.display(),
        accounts = snapshot.accounts.len(),
        "Loaded account snapshot"
    );

    let months = horizon(config.planning.start_year, config.planning.num_years)
        .map_err(|err| AppError::Validation(err.to_string()))?;
    let today = config
        .planning
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let input = ProjectionInput {
        today,
        accounts: snapshot.accounts,
        months,
        rates: RatesTable::from_parameter_sets(&config.parameters),
    };

    let cache = ProjectionCache::new();
    let result = cache
        .run_cached(&input)
        .map_err(|err| AppError::Projection(err.to_string()))?;
    let rows = result.rows.as_slice();
    info!(
        start_year = config.planning.start_year,
        months = rows.len(),
        input_hash = %result.input_hash,
        %today,
        "Projection complete"
    );

    let summary = PlanningSummary::from_table(rows);
    print_rows(rows);
    print_summary(&summary);

    let json = serde_json::to_string(&summary)
        .map_err(|err| AppError::Internal(format!("Failed to encode summary: {err}")))?;
    tracing::debug!(summary = %json, "Projection summary");

    Ok(())
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pennyplan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, exit) = err
                .downcast_ref::<AppError>()
                .map_or(("INTERNAL_ERROR", 1), |app| (app.error_code(), app.exit_code()));
            error!(code, error = %err, "Projection failed");
            ExitCode::from(u8::try_from(exit).unwrap_or(1))
        }
    }
}
