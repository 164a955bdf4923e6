//! Command implementations for the Licensight CLI.

pub mod analyze;
pub mod ask;
pub mod forecast;
pub mod licenses;
pub mod recommend;
pub mod report;
pub mod seed;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use licensight_core::{
    ForecastingEngine, LicenseRecord, LicenseStore, LicensightConfig, RecommendationEngine,
    UsagePoint, UtilizationAnalyzer,
};
use serde::Serialize;

/// Everything a command needs, resolved once from flags and configuration.
#[derive(Debug)]
pub struct CommandContext {
    pub config: LicensightConfig,
    pub store: LicenseStore,
    pub json: bool,
    pub today: NaiveDate,
}

impl CommandContext {
    pub fn engine(&self) -> RecommendationEngine {
        RecommendationEngine::new(
            UtilizationAnalyzer::new(self.config.anomaly()),
            ForecastingEngine::with_today(self.today),
        )
    }

    /// The license and its usage series.
    ///
    /// Fails for unknown ids and for licenses without recorded usage.
    pub fn license_series(&self, license_id: &str) -> Result<(LicenseRecord, Vec<UsagePoint>)> {
        let license = self
            .store
            .require_license(license_id)
            .with_context(|| format!("Failed to load license {}", license_id))?;
        let usage = self.store.usage_for(license_id).context("Failed to read usage metrics")?;
        if usage.is_empty() {
            bail!("No usage data recorded for {}", license_id);
        }
        Ok((license, usage))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
