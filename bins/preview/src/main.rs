//! Amortis schedule preview
//!
//! Reads terms as JSON from `--input` or stdin and prints the generated
//! schedule, its summary and optional valuations as JSON.
//!
//! Usage: amortis-preview schedule --input request.json --as-of 2025-06-30

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use amortis_core::amortization::{
    AmortizationRequest, AnalyticValuator, ElapsedRule, Schedule, ScheduleGenerator, value_at,
};
use amortis_core::fixed_assets::{AssetTerms, register_asset};
use amortis_core::loans::{LoanQuote, LoanTerms};
use amortis_shared::AppConfig;

/// Preview amortization and depreciation schedules.
#[derive(Parser)]
#[command(name = "amortis-preview", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON input file; reads stdin when omitted
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Also value the schedule as of this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    /// Elapsed-period rule for the analytic valuation
    #[arg(long, global = true, value_enum, default_value_t = RuleArg::Completed)]
    rule: RuleArg,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a schedule from an amortization request
    Schedule,
    /// Quote and generate a loan repayment schedule from loan terms
    Loan,
    /// Generate book and tax depreciation schedules from asset terms
    Asset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RuleArg {
    /// A period counts once its last day has passed
    Completed,
    /// Legacy rule: the month in progress counts from its start day
    InProgress,
}

impl From<RuleArg> for ElapsedRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Completed => Self::CompletedPeriods,
            RuleArg::InProgress => Self::InProgressMonth,
        }
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let generator = ScheduleGenerator::from_config(&config.engine);
    let input = read_input(cli.input.as_ref())?;
    debug!(bytes = input.len(), "read input");

    let output = match cli.command {
        Command::Schedule => {
            let request: AmortizationRequest = parse(&input)?;
            let schedule = generator.generate(&request)?;
            let mut output = schedule_json(&schedule)?;
            if let Some(as_of) = cli.as_of {
                let analytic = AnalyticValuator::new(generator)
                    .with_rule(cli.rule.into())
                    .value_at(&request, as_of)?;
                output["valuation"] = json!({
                    "as_of": as_of,
                    "schedule": value_at(&schedule, as_of),
                    "analytic": analytic,
                });
            }
            output
        }
        Command::Loan => {
            let terms: LoanTerms = parse(&input)?;
            let schedule = terms.schedule(&generator)?;
            let mut output = schedule_json(&schedule)?;
            output["quote"] = serde_json::to_value(LoanQuote::from_schedule(&schedule)?)?;
            add_lookup(&mut output, &schedule, cli.as_of);
            output
        }
        Command::Asset => {
            let terms: AssetTerms = parse(&input)?;
            let registered = register_asset(&generator, &terms)?;
            let mut output = json!({
                "book": schedule_json(&registered.book)?,
                "tax": registered.tax.as_ref().map(schedule_json).transpose()?,
            });
            add_lookup(&mut output["book"], &registered.book, cli.as_of);
            if let Some(tax) = &registered.tax {
                add_lookup(&mut output["tax"], tax, cli.as_of);
            }
            output
        }
    };

    info!("schedule preview generated");
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn parse<T: DeserializeOwned>(input: &str) -> Result<T> {
    serde_json::from_str(input).context("input is not valid JSON for this command")
}

fn schedule_json(schedule: &Schedule) -> Result<Value> {
    Ok(json!({
        "summary": schedule.summary()?,
        "periods": schedule.periods,
    }))
}

fn add_lookup(output: &mut Value, schedule: &Schedule, as_of: Option<NaiveDate>) {
    if let Some(as_of) = as_of {
        output["valuation"] = json!({
            "as_of": as_of,
            "schedule": value_at(schedule, as_of),
        });
    }
}
