//! License listing command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Color, Table};
use licensight_core::LicenseStatus;

use super::{CommandContext, print_json};
use crate::colors;
use crate::format::dollars;

const fn status_label(status: LicenseStatus) -> (&'static str, Color) {
    match status {
        LicenseStatus::Active => ("active", Color::Green),
        LicenseStatus::PendingRenewal => ("pending renewal", Color::Yellow),
        LicenseStatus::Expired => ("expired", Color::Red),
        LicenseStatus::Cancelled => ("cancelled", Color::DarkGrey),
    }
}

/// Execute licenses command.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let licenses = ctx.store.licenses().context("Failed to read licenses")?;

    if ctx.json {
        return print_json(&licenses);
    }

    if licenses.is_empty() {
        println!("{}", "No licenses found.".yellow());
        println!("Run {} to load sample data.", "licensight seed".bold());
        return Ok(());
    }

    println!("{}", colors::heading(&format!("Licenses ({})", licenses.len())));
    println!();

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Vendor", "Billing", "Total Cost", "Ends", "Expires In", "Units", "Status",
    ]);
    for license in &licenses {
        let units = match (license.current_units, license.max_units) {
            (Some(current), Some(max)) => format!("{} / {}", current, max),
            (Some(current), None) => current.to_string(),
            _ => "-".to_string(),
        };
        let (status, status_color) = status_label(license.status);
        let days = license.days_to_expiry(ctx.today);
        let expiry_color = if days < 0 {
            Color::Red
        } else if days <= 30 {
            Color::Yellow
        } else {
            Color::Reset
        };
        table.add_row(vec![
            Cell::new(&license.id),
            Cell::new(&license.name),
            Cell::new(&license.vendor),
            Cell::new(license.billing_model.to_string()),
            Cell::new(dollars(license.total_cost)),
            Cell::new(license.end_date.to_string()),
            Cell::new(format!("{} days", days)).fg(expiry_color),
            Cell::new(units),
            Cell::new(status).fg(status_color),
        ]);
    }
    println!("{table}");
    Ok(())
}
