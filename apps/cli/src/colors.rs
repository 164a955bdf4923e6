//! Colors for decisions, priorities and trends.
//!
//! Headings and labels go through `colored`; table cells use the
//! `comfy-table` palette.

use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Color};
use licensight_core::{Decision, ForecastTrend, Priority};

/// Utilization below this is shown as wasted capacity.
const LOW_UTILIZATION: f64 = 30.0;
/// Utilization above this is shown as running hot.
const HIGH_UTILIZATION: f64 = 80.0;

pub fn heading(text: &str) -> ColoredString {
    text.bold().cyan()
}

pub const fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::Renew => Color::Green,
        Decision::Cancel => Color::Red,
        Decision::Downgrade => Color::Yellow,
        Decision::Negotiate => Color::Magenta,
    }
}

pub fn decision_label(decision: Decision) -> ColoredString {
    let label = decision.to_string().to_uppercase();
    match decision {
        Decision::Renew => label.green().bold(),
        Decision::Cancel => label.red().bold(),
        Decision::Downgrade => label.yellow().bold(),
        Decision::Negotiate => label.magenta().bold(),
    }
}

pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub const fn trend_color(trend: ForecastTrend) -> Color {
    match trend {
        ForecastTrend::Upward => Color::Yellow,
        ForecastTrend::Downward => Color::Blue,
        ForecastTrend::Stable => Color::Green,
    }
}

/// Percentage cell colored by how much of the contract is in use.
pub fn utilization_cell(utilization: f64) -> Cell {
    let color = if utilization < LOW_UTILIZATION {
        Color::Red
    } else if utilization > HIGH_UTILIZATION {
        Color::Yellow
    } else {
        Color::Green
    };
    Cell::new(crate::format::percent(utilization)).fg(color)
}
