//! Portfolio report command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Cell, Table};
use licensight_core::reports::{
    ApTeamReport, Dashboard, ExecutiveReport, LicenseSummaryReport, ProcurementReport,
};
use licensight_core::{Portfolio, Reporter};

use super::{CommandContext, print_json};
use crate::colors;
use crate::format::{dollars, percent, ratio};

/// Cost trend days shown in the human dashboard.
const DASHBOARD_TREND_ROWS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// License summary with recommendations and breakdowns
    Summary,
    /// Accounts payable: renewals, budget and payments
    ApTeam,
    /// Procurement: vendors and negotiation leverage
    Procurement,
    /// Executive: spend overview and strategic recommendations
    Executive,
    /// Dashboard overview
    Dashboard,
}

/// Execute report command.
pub fn execute(ctx: &CommandContext, kind: ReportKind) -> Result<()> {
    let portfolio = Portfolio::load(&ctx.store).context("Failed to load portfolio")?;
    let engine = ctx.engine();
    let reporter = Reporter::new(&portfolio, &engine, Utc::now());

    match kind {
        ReportKind::Summary => {
            let report = reporter.license_summary();
            if ctx.json {
                return print_json(&report);
            }
            print_summary(&report);
        }
        ReportKind::ApTeam => {
            let report = reporter.ap_team();
            if ctx.json {
                return print_json(&report);
            }
            print_ap_team(&report);
        }
        ReportKind::Procurement => {
            let report = reporter.procurement();
            if ctx.json {
                return print_json(&report);
            }
            print_procurement(&report);
        }
        ReportKind::Executive => {
            let report = reporter.executive();
            if ctx.json {
                return print_json(&report);
            }
            print_executive(&report);
        }
        ReportKind::Dashboard => {
            let dashboard = reporter.dashboard();
            if ctx.json {
                return print_json(&dashboard);
            }
            print_dashboard(&dashboard);
        }
    }
    Ok(())
}

fn print_summary(report: &LicenseSummaryReport) {
    println!("{}", colors::heading("License Summary Report"));
    println!("{}  {} to {}", report.report_id.dimmed(), report.period_start, report.period_end);
    println!();
    println!("  Licenses:            {}", report.total_licenses);
    println!("  Total cost:          {}", dollars(report.total_cost));
    println!("  Average utilization: {}", percent(report.total_utilization));
    let summary = &report.utilization_summary;
    println!(
        "  Seat utilization:    {} high, {} medium, {} low",
        summary.high_utilization, summary.medium_utilization, summary.low_utilization
    );
    let forecast = &report.forecast_summary;
    println!(
        "  Forecasts:           {} upward, {} stable, {} downward ({} projected)",
        forecast.upward,
        forecast.stable,
        forecast.downward,
        dollars(forecast.projected_cost)
    );

    println!();
    println!("{}", "Cost by vendor".bold());
    let mut vendors = Table::new();
    vendors.set_header(vec!["Vendor", "Cost"]);
    for (vendor, cost) in &report.cost_breakdown {
        vendors.add_row(vec![Cell::new(vendor), Cell::new(dollars(*cost))]);
    }
    println!("{vendors}");

    println!();
    println!("{}", "Recommendations".bold());
    let mut table = Table::new();
    table.set_header(vec!["License", "Decision", "Confidence", "Priority", "Savings"]);
    for recommendation in &report.recommendations {
        table.add_row(vec![
            Cell::new(&recommendation.license_id),
            Cell::new(recommendation.recommendation.to_string())
                .fg(colors::decision_color(recommendation.recommendation)),
            Cell::new(ratio(recommendation.confidence)),
            Cell::new(recommendation.priority.to_string())
                .fg(colors::priority_color(recommendation.priority)),
            Cell::new(recommendation.estimated_savings.map_or_else(|| "-".to_string(), dollars)),
        ]);
    }
    println!("{table}");
}

fn print_ap_team(report: &ApTeamReport) {
    println!("{}", colors::heading("AP Team Report"));
    println!("{}", report.report_id.dimmed());
    println!();
    let budget = &report.budget_impact;
    println!("  Annual cost:    {}", dollars(budget.total));
    println!("  Monthly cost:   {}", dollars(budget.monthly));
    println!("  Quarterly cost: {}", dollars(budget.quarterly));

    println!();
    if report.upcoming_renewals.is_empty() {
        println!("{}", "No renewals in the next 90 days".green());
    } else {
        println!("{}", format!("Upcoming renewals ({})", report.upcoming_renewals.len()).bold());
        let mut table = Table::new();
        table.set_header(vec!["License", "Vendor", "Expires", "Days", "Cost"]);
        for renewal in &report.upcoming_renewals {
            table.add_row(vec![
                Cell::new(&renewal.license_name),
                Cell::new(&renewal.vendor),
                Cell::new(renewal.expiry_date.to_string()),
                Cell::new(renewal.days_to_expiry),
                Cell::new(dollars(renewal.cost)),
            ]);
        }
        println!("{table}");
    }

    if !report.payment_schedule.is_empty() {
        println!();
        println!("{}", "Payment schedule".bold());
        let mut table = Table::new();
        table.set_header(vec!["License", "Due", "Amount"]);
        for payment in &report.payment_schedule {
            table.add_row(vec![
                Cell::new(&payment.license_name),
                Cell::new(payment.next_payment_date.to_string()),
                Cell::new(dollars(payment.amount)),
            ]);
        }
        println!("{table}");
    }

    if !report.cost_optimization_opportunities.is_empty() {
        println!();
        println!("{}", "Optimization opportunities".bold());
        for opportunity in &report.cost_optimization_opportunities {
            println!(
                "  • {}: {} (saves {})",
                opportunity.license_name,
                opportunity.recommendation,
                dollars(opportunity.potential_savings).green()
            );
        }
    }
}

fn print_procurement(report: &ProcurementReport) {
    println!("{}", colors::heading("Procurement Report"));
    println!("{}", report.report_id.dimmed());
    println!();
    let benchmarks = &report.market_benchmarks;
    println!("  Vendors:               {}", benchmarks.total_vendors);
    println!("  Average license cost:  {}", dollars(benchmarks.average_license_cost));
    if let Some(vendor) = &benchmarks.most_expensive_vendor {
        println!("  Most expensive vendor: {}", vendor);
    }

    println!();
    let mut table = Table::new();
    table.set_header(vec!["Vendor", "Licenses", "Total Spend", "Average Cost"]);
    for (vendor, performance) in &report.supplier_performance {
        table.add_row(vec![
            Cell::new(vendor),
            Cell::new(performance.license_count),
            Cell::new(dollars(performance.total_spend)),
            Cell::new(dollars(performance.average_license_cost)),
        ]);
    }
    println!("{table}");

    if !report.contract_negotiation_opportunities.is_empty() {
        println!();
        println!("{}", "Negotiation opportunities".bold());
        for opportunity in &report.contract_negotiation_opportunities {
            println!(
                "  • {} ({}): {} (saves {})",
                opportunity.license_name,
                opportunity.vendor,
                opportunity.decision,
                dollars(opportunity.potential_savings)
            );
        }
    }

    if !report.cost_reduction_recommendations.is_empty() {
        println!();
        println!("{}", "Cost reductions".bold());
        let mut table = Table::new();
        table.set_header(vec!["License", "Vendor", "Decision", "Savings", "Priority"]);
        for reduction in &report.cost_reduction_recommendations {
            table.add_row(vec![
                Cell::new(&reduction.license_name),
                Cell::new(&reduction.vendor),
                Cell::new(reduction.recommendation.to_string())
                    .fg(colors::decision_color(reduction.recommendation)),
                Cell::new(dollars(reduction.potential_savings)),
                Cell::new(reduction.priority.to_string())
                    .fg(colors::priority_color(reduction.priority)),
            ]);
        }
        println!("{table}");
    }
}

fn print_executive(report: &ExecutiveReport) {
    println!("{}", colors::heading("Executive Summary Report"));
    println!("{}", report.report_id.dimmed());
    println!();
    let summary = &report.executive_summary;
    println!("  Total software spend:   {}", dollars(summary.total_software_spend));
    println!("  Licenses:               {}", summary.license_count);
    println!("  Average utilization:    {}", percent(summary.average_utilization));
    println!("  Optimization potential: {}", summary.optimization_potential.to_string().bold());
    let metrics = &report.key_metrics;
    println!(
        "  Seat utilization:       {} high, {} low",
        metrics.high_utilization_count, metrics.low_utilization_count
    );
    println!("  Cost efficiency score:  {:.2}", metrics.cost_efficiency_score);

    println!();
    println!("{}", "Strategic recommendations".bold());
    for recommendation in &report.strategic_recommendations {
        println!("  • {}", recommendation);
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("{}", colors::heading("License Dashboard"));
    println!();
    println!("  Licenses:            {}", dashboard.total_licenses);
    println!("  Total cost:          {}", dollars(dashboard.total_cost));
    println!("  Average utilization: {}", percent(dashboard.avg_utilization));

    println!();
    println!("{}", "Utilization distribution (30-day average)".bold());
    for bucket in &dashboard.utilization_distribution {
        println!("  {:>8}%  {}", bucket.range, "■".repeat(bucket.count));
    }

    let recent = dashboard.cost_trend.len().saturating_sub(DASHBOARD_TREND_ROWS);
    if recent < dashboard.cost_trend.len() {
        println!();
        println!("{}", "Daily cost, last 7 days".bold());
        for day in &dashboard.cost_trend[recent..] {
            println!("  {}  {}", day.date, dollars(day.cost));
        }
    }

    println!();
    let mut table = Table::new();
    table.set_header(vec!["License", "Decision", "Confidence", "Savings", "Priority"]);
    for row in &dashboard.recommendations {
        table.add_row(vec![
            Cell::new(&row.license_name),
            Cell::new(row.recommendation.to_string())
                .fg(colors::decision_color(row.recommendation)),
            Cell::new(ratio(row.confidence)),
            Cell::new(dollars(row.estimated_savings)),
            Cell::new(row.priority.to_string()).fg(colors::priority_color(row.priority)),
        ]);
    }
    println!("{table}");
}
