//! Usage and cost forecast command implementation.

use anyhow::{Result, bail};
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{CommandContext, print_json};
use crate::colors;
use crate::format::{dollars, ratio};

/// Longest horizon accepted from `--days` (ten years).
const MAX_FORECAST_DAYS: usize = 3_650;

/// Execute forecast command.
pub fn execute(ctx: &CommandContext, license_id: &str, days: Option<usize>) -> Result<()> {
    let days = days.unwrap_or_else(|| ctx.config.horizon_days());
    if days == 0 {
        bail!("--days must be at least 1");
    }
    if days > MAX_FORECAST_DAYS {
        bail!("--days must be at most {}", MAX_FORECAST_DAYS);
    }

    let (license, usage) = ctx.license_series(license_id)?;
    let forecast = ctx.engine().forecaster().forecast(&usage, &license, days);

    if ctx.json {
        return print_json(&forecast);
    }

    println!("{}", colors::heading(&format!("{}-day forecast: {}", days, license.name)));
    if let Some(first) = forecast.first() {
        let total_cost: f64 = forecast.iter().map(|p| p.predicted_cost).sum();
        let mean_usage =
            forecast.iter().map(|p| p.predicted_usage).sum::<f64>() / forecast.len() as f64;
        println!(
            "Trend: {}  Average usage: {:.1}  Projected cost: {}",
            first.trend.to_string().bold(),
            mean_usage,
            dollars(total_cost).bold()
        );
    }
    println!();

    let mut table = Table::new();
    table.set_header(vec!["Date", "Usage", "Cost", "Confidence", "Trend"]);
    for point in &forecast {
        table.add_row(vec![
            Cell::new(point.forecast_date.to_string()),
            Cell::new(format!("{:.1}", point.predicted_usage)),
            Cell::new(format!("${:.2}", point.predicted_cost)),
            Cell::new(ratio(point.confidence_score)),
            Cell::new(point.trend.to_string()).fg(colors::trend_color(point.trend)),
        ]);
    }
    println!("{table}");
    Ok(())
}
