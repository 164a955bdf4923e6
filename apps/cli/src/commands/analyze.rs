//! Utilization analysis command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use super::{CommandContext, print_json};
use crate::colors;
use crate::format::{dollars, percent, ratio};

/// Execute analyze command.
pub fn execute(ctx: &CommandContext, license_id: &str) -> Result<()> {
    let (license, usage) = ctx.license_series(license_id)?;
    let profile = ctx
        .engine()
        .analyzer()
        .analyze(&usage)
        .with_context(|| format!("Failed to analyze {}", license_id))?;

    if ctx.json {
        return print_json(&profile);
    }

    println!("{}", colors::heading(&format!("Utilization profile: {}", license.name)));
    println!(
        "{} records from {} to {}",
        profile.total_records, profile.date_range.start, profile.date_range.end
    );
    println!();

    let stats = &profile.utilization_stats;
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Mean utilization"), colors::utilization_cell(stats.mean)]);
    table.add_row(vec![Cell::new("Median utilization"), Cell::new(percent(stats.median))]);
    table.add_row(vec![Cell::new("Std deviation"), Cell::new(format!("{:.2}", stats.std))]);
    table.add_row(vec![
        Cell::new("Range"),
        Cell::new(format!("{} - {}", percent(stats.min), percent(stats.max))),
    ]);
    table.add_row(vec![
        Cell::new("Total cost"),
        Cell::new(dollars(profile.cost_analysis.total_cost)),
    ]);
    table.add_row(vec![
        Cell::new("Average daily cost"),
        Cell::new(format!("${:.2}", profile.cost_analysis.average_daily_cost)),
    ]);
    table.add_row(vec![
        Cell::new("Cost trend"),
        Cell::new(profile.cost_analysis.cost_trend.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Usage growth rate"),
        Cell::new(ratio(profile.usage_trends.growth_rate)),
    ]);
    println!("{table}");

    println!();
    println!("{}", "Seasonality".bold());
    let seasonality = &profile.seasonality;
    if seasonality.insufficient_data {
        println!("  Not enough history to measure seasonality");
    } else {
        if let Some(strength) = seasonality.strength {
            println!("  Strength: {:.2}", strength);
        }
        if let (Some(peak), Some(low)) = (seasonality.peak_month, seasonality.low_month) {
            println!("  Peak month: {}  Low month: {}", peak, low);
        }
    }

    println!();
    if profile.anomalies.is_empty() {
        println!("{}", "No usage anomalies detected".green());
        return Ok(());
    }

    println!("{}", format!("Anomalies ({})", profile.anomalies.len()).yellow().bold());
    let mut anomalies = Table::new();
    anomalies.set_header(vec!["Date", "Utilization", "Cost", "Score"]);
    for anomaly in &profile.anomalies {
        anomalies.add_row(vec![
            Cell::new(anomaly.date.to_string()),
            Cell::new(percent(anomaly.utilization)),
            Cell::new(format!("${:.2}", anomaly.cost)),
            Cell::new(format!("{:.3}", anomaly.anomaly_score)).fg(Color::Yellow),
        ]);
    }
    println!("{anomalies}");
    Ok(())
}
