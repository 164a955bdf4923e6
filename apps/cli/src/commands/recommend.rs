//! Renewal recommendation command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{CommandContext, print_json};
use crate::colors;
use crate::format::{dollars, ratio};

/// Execute recommend command.
pub fn execute(ctx: &CommandContext, license_id: &str) -> Result<()> {
    let (license, usage) = ctx.license_series(license_id)?;
    let recommendation = ctx
        .engine()
        .recommend(&license, &usage)
        .with_context(|| format!("Failed to build a recommendation for {}", license_id))?;

    if ctx.json {
        return print_json(&recommendation);
    }

    println!("{}", colors::heading(&format!("Recommendation: {}", license.name)));
    println!();
    println!("  Decision:   {}", colors::decision_label(recommendation.recommendation));
    println!("  Confidence: {}", ratio(recommendation.confidence));
    println!("  Priority:   {}", recommendation.priority);
    match recommendation.estimated_savings {
        Some(savings) => println!("  Savings:    {}", dollars(savings).green()),
        None => println!("  Savings:    {}", "n/a".dimmed()),
    }

    println!();
    println!("{}", "Reasoning".bold());
    for reason in &recommendation.reasoning {
        println!("  • {}", reason);
    }

    if !recommendation.risk_factors.is_empty() {
        println!();
        println!("{}", "Risks".yellow().bold());
        for risk in &recommendation.risk_factors {
            println!("  ⚠ {}", risk);
        }
    }

    if !recommendation.alternative_options.is_empty() {
        println!();
        println!("{}", "Alternatives".bold());
        let mut table = Table::new();
        table.set_header(vec!["Option", "Description", "Estimated Savings"]);
        for alternative in &recommendation.alternative_options {
            table.add_row(vec![
                Cell::new(alternative.option.label()),
                Cell::new(&alternative.description),
                Cell::new(dollars(alternative.estimated_savings)),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}
