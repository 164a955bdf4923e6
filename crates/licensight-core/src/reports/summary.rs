//! Portfolio summary report.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Reporter;
use crate::models::{ForecastTrend, Recommendation};

/// Capacity ratio above which a license counts as highly utilized.
pub(super) const HIGH_CAPACITY_RATIO: f64 = 0.8;
/// Capacity ratio below which a license counts as under-utilized.
pub(super) const LOW_CAPACITY_RATIO: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseSummaryReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_licenses: usize,
    pub total_cost: f64,
    /// Mean utilization over every usage point in the portfolio.
    pub total_utilization: f64,
    pub recommendations: Vec<Recommendation>,
    /// Contracted cost per vendor.
    pub cost_breakdown: BTreeMap<String, f64>,
    pub utilization_summary: UtilizationSummary,
    pub forecast_summary: ForecastSummary,
}

/// License counts by current-to-maximum seat ratio.
///
/// Licenses without both unit counts land in `medium_utilization`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub high_utilization: usize,
    pub medium_utilization: usize,
    pub low_utilization: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_forecasts: usize,
    pub upward: usize,
    pub downward: usize,
    pub stable: usize,
    /// Sum of predicted cost across every forecast day and license.
    pub projected_cost: f64,
}

impl Reporter<'_> {
    /// Recommendations plus cost and utilization breakdowns for the past year.
    pub fn license_summary(&self) -> LicenseSummaryReport {
        let licenses = self.portfolio.licenses();

        let mut cost_breakdown: BTreeMap<String, f64> = BTreeMap::new();
        for license in licenses {
            *cost_breakdown.entry(license.vendor.clone()).or_default() += license.total_cost;
        }

        let ratios: Vec<Option<f64>> = licenses.iter().map(|l| l.capacity_ratio()).collect();
        let high = ratios.iter().flatten().filter(|&&r| r > HIGH_CAPACITY_RATIO).count();
        let low = ratios.iter().flatten().filter(|&&r| r < LOW_CAPACITY_RATIO).count();
        let utilization_summary = UtilizationSummary {
            high_utilization: high,
            medium_utilization: licenses.len() - high - low,
            low_utilization: low,
        };

        let mut forecast_summary = ForecastSummary {
            total_forecasts: 0,
            upward: 0,
            downward: 0,
            stable: 0,
            projected_cost: 0.0,
        };
        for assessed in &self.assessed {
            let forecast = &assessed.assessment.forecast;
            let Some(first) = forecast.first() else {
                continue;
            };
            forecast_summary.total_forecasts += 1;
            match first.trend {
                ForecastTrend::Upward => forecast_summary.upward += 1,
                ForecastTrend::Downward => forecast_summary.downward += 1,
                ForecastTrend::Stable => forecast_summary.stable += 1,
            }
            forecast_summary.projected_cost +=
                forecast.iter().map(|p| p.predicted_cost).sum::<f64>();
        }

        LicenseSummaryReport {
            report_id: self.report_id("LSR"),
            generated_at: self.generated_at,
            period_start: self.today - Duration::days(365),
            period_end: self.today,
            total_licenses: licenses.len(),
            total_cost: self.portfolio.total_cost(),
            total_utilization: self.portfolio.mean_utilization(),
            recommendations: self
                .assessed
                .iter()
                .map(|a| a.assessment.recommendation.clone())
                .collect(),
            cost_breakdown,
            utilization_summary,
            forecast_summary,
        }
    }
}
