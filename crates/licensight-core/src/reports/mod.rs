//! Portfolio-wide reports.
//!
//! A [`Reporter`] assesses every license in a [`Portfolio`] once and derives
//! the summary, accounts-payable, procurement, executive and dashboard views
//! from those assessments.

mod ap_team;
mod dashboard;
mod executive;
mod procurement;
mod summary;

use std::collections::HashMap;
use std::thread;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

pub use ap_team::{
    ApTeamReport, BudgetImpact, CostAnalysis, OptimizationOpportunity, ScheduledPayment,
    UpcomingRenewal,
};
pub use dashboard::{Dashboard, DashboardRow};
pub use executive::{
    ExecutiveReport, ExecutiveSummary, KeyMetrics, OptimizationPotential, StrategicRecommendation,
};
pub use procurement::{
    CostReduction, MarketBenchmarks, NegotiationOpportunity, ProcurementReport,
    SupplierPerformance, VendorSummary,
};
pub use summary::{ForecastSummary, LicenseSummaryReport, UtilizationSummary};

use crate::engine::{Assessment, RecommendationEngine};
use crate::error::AnalyticsError;
use crate::models::{LicenseRecord, UsagePoint};
use crate::store::{LicenseStore, StoreResult};

/// All licenses with their usage grouped by license id.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    licenses: Vec<LicenseRecord>,
    usage: Vec<UsagePoint>,
    by_license: HashMap<String, Vec<usize>>,
}

impl Portfolio {
    pub fn new(licenses: Vec<LicenseRecord>, usage: Vec<UsagePoint>) -> Self {
        let mut by_license: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, point) in usage.iter().enumerate() {
            by_license.entry(point.license_id.clone()).or_default().push(i);
        }
        Self { licenses, usage, by_license }
    }

    pub fn load(store: &LicenseStore) -> StoreResult<Self> {
        Ok(Self::new(store.licenses()?, store.usage()?))
    }

    pub fn licenses(&self) -> &[LicenseRecord] {
        &self.licenses
    }

    pub fn usage(&self) -> &[UsagePoint] {
        &self.usage
    }

    pub fn usage_for(&self, license_id: &str) -> Vec<UsagePoint> {
        self.by_license
            .get(license_id)
            .map(|indices| indices.iter().map(|&i| self.usage[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Sum of contracted cost across licenses.
    pub fn total_cost(&self) -> f64 {
        self.licenses.iter().map(|license| license.total_cost).sum()
    }

    /// Mean utilization over every usage point; 0 without usage.
    pub fn mean_utilization(&self) -> f64 {
        if self.usage.is_empty() {
            return 0.0;
        }
        self.usage.iter().map(|point| point.utilization_percentage).sum::<f64>()
            / self.usage.len() as f64
    }

    /// Assesses each license on its own worker thread.
    ///
    /// Licenses without usage are skipped; results keep license order.
    pub fn assess_all(&self, engine: &RecommendationEngine) -> Vec<AssessedLicense> {
        let results: Vec<(&LicenseRecord, Result<Assessment, AnalyticsError>)> =
            thread::scope(|scope| {
                let handles: Vec<_> = self
                    .licenses
                    .iter()
                    .map(|license| {
                        let series = self.usage_for(&license.id);
                        scope.spawn(move || (license, engine.assess(license, &series)))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                    })
                    .collect()
            });

        results
            .into_iter()
            .filter_map(|(license, result)| match result {
                Ok(assessment) => Some(AssessedLicense { license: license.clone(), assessment }),
                Err(err) => {
                    warn!(license_id = %license.id, error = %err, "Skipping license");
                    None
                }
            })
            .collect()
    }
}

/// A license together with its engine assessment.
#[derive(Debug, Clone)]
pub struct AssessedLicense {
    pub license: LicenseRecord,
    pub assessment: Assessment,
}

/// Builds reports from one set of assessments.
#[derive(Debug)]
pub struct Reporter<'a> {
    portfolio: &'a Portfolio,
    assessed: Vec<AssessedLicense>,
    today: NaiveDate,
    generated_at: DateTime<Utc>,
}

impl<'a> Reporter<'a> {
    /// Assesses the portfolio with `engine`; report dates follow `engine.today()`.
    pub fn new(
        portfolio: &'a Portfolio,
        engine: &RecommendationEngine,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let assessed = portfolio.assess_all(engine);
        debug!(
            licenses = portfolio.licenses().len(),
            assessed = assessed.len(),
            "Assessed portfolio"
        );
        Self { portfolio, assessed, today: engine.today(), generated_at }
    }

    pub fn assessed(&self) -> &[AssessedLicense] {
        &self.assessed
    }

    fn report_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.generated_at.format("%Y%m%d_%H%M%S"))
    }
}
