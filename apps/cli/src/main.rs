//! Licensight CLI - Command-line interface for software license analytics
//!
//! This CLI provides a `licensight` command for profiling license utilization,
//! forecasting usage and cost, recommending renewal decisions and building
//! portfolio reports from a JSON data directory.

mod answers;
mod colors;
mod commands;
mod config;
mod format;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use licensight_core::LicenseStore;
use tracing_subscriber::FmtSubscriber;

use commands::report::ReportKind;
use commands::{CommandContext, analyze, ask, forecast, licenses, recommend, report, seed};

/// Licensight - software license utilization analytics
///
/// Profiles how licenses are used, forecasts usage and cost, and recommends
/// whether to renew, cancel, downgrade or renegotiate each contract.
#[derive(Parser, Debug)]
#[command(
    name = "licensight",
    author,
    version,
    about = "Licensight - software license utilization analytics"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Data directory holding licenses.json and usage_metrics.json
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load six demonstration contracts with 90 days of generated usage
    Seed {
        /// Random seed for the generated usage
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Replace existing data
        #[arg(long)]
        force: bool,
    },

    /// List licenses
    Licenses,

    /// Profile a license's utilization, cost, trends and anomalies
    Analyze {
        /// License ID (e.g. slack_001)
        license_id: String,
    },

    /// Forecast daily usage and cost for a license
    Forecast {
        /// License ID (e.g. slack_001)
        license_id: String,

        /// Number of days to forecast (defaults to the configured horizon)
        #[arg(long)]
        days: Option<usize>,
    },

    /// Recommend a renewal decision for a license
    Recommend {
        /// License ID (e.g. slack_001)
        license_id: String,
    },

    /// Build a portfolio report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
    },

    /// Ask a question in plain language
    Ask {
        /// The message, e.g. "show me the dashboard"
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Conversation session ID
        #[arg(long, default_value = "default")]
        session: String,

        /// User the conversation belongs to
        #[arg(long, default_value = "local")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cli_config = config::load_config(args.json)?;

    // Logs go to stderr so --json output stays parseable.
    let level = config::log_level(args.log_level.as_deref(), &cli_config);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let data_dir = config::data_dir(args.data_dir, &cli_config);
    let store = LicenseStore::open(&data_dir)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    let ctx = CommandContext {
        json: cli_config.wants_json(),
        today: args.as_of.unwrap_or_else(|| Utc::now().date_naive()),
        config: cli_config,
        store,
    };

    match args.command {
        Command::Seed { seed: rng_seed, force } => seed::execute(&ctx, rng_seed, force)?,
        Command::Licenses => licenses::execute(&ctx)?,
        Command::Analyze { license_id } => analyze::execute(&ctx, &license_id)?,
        Command::Forecast { license_id, days } => forecast::execute(&ctx, &license_id, days)?,
        Command::Recommend { license_id } => recommend::execute(&ctx, &license_id)?,
        Command::Report { kind } => report::execute(&ctx, kind)?,
        Command::Ask { message, session, user } => {
            ask::execute(&ctx, &message.join(" "), &user, &session).await?;
        }
    }

    Ok(())
}
