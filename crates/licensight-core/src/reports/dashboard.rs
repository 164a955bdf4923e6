//! Dashboard summary.

use serde::{Deserialize, Serialize};

use super::Reporter;
use crate::models::{Decision, Priority};
use crate::store::{DailyCost, UtilizationBucket, daily_costs, utilization_distribution};

const COST_TREND_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub total_licenses: usize,
    pub total_cost: f64,
    pub avg_utilization: f64,
    pub cost_trend: Vec<DailyCost>,
    pub utilization_distribution: Vec<UtilizationBucket>,
    pub recommendations: Vec<DashboardRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub license_id: String,
    pub license_name: String,
    pub recommendation: Decision,
    pub confidence: f64,
    /// Zero when no estimate is available.
    pub estimated_savings: f64,
    pub priority: Priority,
}

impl Reporter<'_> {
    pub fn dashboard(&self) -> Dashboard {
        let usage = self.portfolio.usage();

        Dashboard {
            total_licenses: self.portfolio.licenses().len(),
            total_cost: self.portfolio.total_cost(),
            avg_utilization: self.portfolio.mean_utilization(),
            cost_trend: daily_costs(usage, COST_TREND_DAYS, self.today),
            utilization_distribution: utilization_distribution(usage, self.today),
            recommendations: self
                .assessed
                .iter()
                .map(|assessed| {
                    let recommendation = &assessed.assessment.recommendation;
                    DashboardRow {
                        license_id: assessed.license.id.clone(),
                        license_name: assessed.license.name.clone(),
                        recommendation: recommendation.recommendation,
                        confidence: recommendation.confidence,
                        estimated_savings: recommendation.estimated_savings.unwrap_or(0.0),
                        priority: recommendation.priority,
                    }
                })
                .collect(),
        }
    }
}
