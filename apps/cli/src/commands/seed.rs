//! Seed command implementation.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::json;

use super::{CommandContext, print_json};

/// Execute seed command.
pub fn execute(ctx: &CommandContext, seed: u64, force: bool) -> Result<()> {
    let data_dir = ctx.store.data_dir().display().to_string();
    if ctx.store.is_initialized() && !force {
        bail!("{} already holds license data; pass --force to replace it", data_dir);
    }

    let count =
        ctx.store.seed_sample_data(ctx.today, seed).context("Failed to seed sample data")?;

    if ctx.json {
        return print_json(&json!({
            "data_dir": data_dir,
            "licenses": count,
            "seed": seed,
        }));
    }

    println!(
        "{} Seeded {} licenses with 90 days of usage into {}",
        "✓".green(),
        count,
        data_dir.bold()
    );
    Ok(())
}
