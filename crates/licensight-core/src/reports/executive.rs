//! Executive report: spend overview, key metrics and strategic direction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reporter;
use super::summary::{HIGH_CAPACITY_RATIO, LOW_CAPACITY_RATIO};

/// Mean utilization below which optimization potential is high.
const HIGH_POTENTIAL_UTILIZATION: f64 = 60.0;
/// Contracted cost above which a license warrants an enterprise agreement.
const ENTERPRISE_DEAL_COST: f64 = 50_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub executive_summary: ExecutiveSummary,
    pub key_metrics: KeyMetrics,
    pub strategic_recommendations: Vec<StrategicRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total_software_spend: f64,
    pub license_count: usize,
    pub average_utilization: f64,
    pub optimization_potential: OptimizationPotential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationPotential {
    High,
    Medium,
}

impl fmt::Display for OptimizationPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub total_cost: f64,
    pub average_utilization: f64,
    pub high_utilization_count: usize,
    pub low_utilization_count: usize,
    /// Mean utilization per 10,000 of contracted spend; 0 without spend.
    pub cost_efficiency_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StrategicRecommendation {
    ConsolidateUnderutilized { count: usize },
    NegotiateEnterpriseAgreements { count: usize },
    RegularUtilizationReviews,
}

impl fmt::Display for StrategicRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsolidateUnderutilized { count } => {
                write!(f, "Consider consolidating {} underutilized licenses", count)
            }
            Self::NegotiateEnterpriseAgreements { .. } => {
                write!(f, "Negotiate enterprise agreements for high-cost licenses")
            }
            Self::RegularUtilizationReviews => {
                write!(f, "Implement regular utilization reviews to optimize costs")
            }
        }
    }
}

impl Reporter<'_> {
    pub fn executive(&self) -> ExecutiveReport {
        let licenses = self.portfolio.licenses();
        let total_cost = self.portfolio.total_cost();
        let average_utilization = self.portfolio.mean_utilization();

        let ratios: Vec<f64> = licenses.iter().filter_map(|l| l.capacity_ratio()).collect();
        let high_utilization_count = ratios.iter().filter(|&&r| r > HIGH_CAPACITY_RATIO).count();
        let low_utilization_count = ratios.iter().filter(|&&r| r < LOW_CAPACITY_RATIO).count();
        let high_cost_count =
            licenses.iter().filter(|license| license.total_cost > ENTERPRISE_DEAL_COST).count();

        let mut strategic_recommendations = Vec::new();
        if low_utilization_count > 0 {
            strategic_recommendations.push(StrategicRecommendation::ConsolidateUnderutilized {
                count: low_utilization_count,
            });
        }
        if high_cost_count > 0 {
            strategic_recommendations.push(
                StrategicRecommendation::NegotiateEnterpriseAgreements { count: high_cost_count },
            );
        }
        strategic_recommendations.push(StrategicRecommendation::RegularUtilizationReviews);

        let optimization_potential = if average_utilization < HIGH_POTENTIAL_UTILIZATION {
            OptimizationPotential::High
        } else {
            OptimizationPotential::Medium
        };
        let cost_efficiency_score = if total_cost > 0.0 {
            average_utilization / (total_cost / 10_000.0)
        } else {
            0.0
        };

        ExecutiveReport {
            report_id: self.report_id("EXR"),
            generated_at: self.generated_at,
            executive_summary: ExecutiveSummary {
                total_software_spend: total_cost,
                license_count: licenses.len(),
                average_utilization,
                optimization_potential,
            },
            key_metrics: KeyMetrics {
                total_cost,
                average_utilization,
                high_utilization_count,
                low_utilization_count,
                cost_efficiency_score,
            },
            strategic_recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::RecommendationEngine;
    use crate::models::{BillingModel, LicenseRecord, LicenseStatus, UsagePoint};
    use crate::reports::Portfolio;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    fn license(id: &str, total_cost: f64, current: u64, max: u64) -> LicenseRecord {
        LicenseRecord {
            id: id.to_string(),
            name: id.to_string(),
            vendor: "Acme".to_string(),
            billing_model: BillingModel::PerUser,
            cost_per_unit: 10.0,
            total_cost,
            period_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            status: LicenseStatus::Active,
            max_units: Some(max),
            current_units: Some(current),
            auto_renewal: false,
        }
    }

    fn point(license_id: &str, utilization: f64) -> UsagePoint {
        UsagePoint::new(license_id, today(), utilization, 10.0, utilization)
    }

    fn report(portfolio: &Portfolio) -> ExecutiveReport {
        let engine = RecommendationEngine::with_today(today());
        let generated_at = today().and_hms_opt(9, 0, 0).unwrap().and_utc();
        Reporter::new(portfolio, &engine, generated_at).executive()
    }

    #[test]
    fn test_executive_strategy_for_mixed_portfolio() {
        let portfolio = Portfolio::new(
            vec![license("crm", 80_000.0, 100, 1_000), license("chat", 20_000.0, 900, 1_000)],
            vec![point("crm", 20.0), point("chat", 60.0)],
        );
        let report = report(&portfolio);

        assert_eq!(report.report_id, "EXR_20240930_090000");
        assert_eq!(report.executive_summary.license_count, 2);
        assert_eq!(report.executive_summary.total_software_spend, 100_000.0);
        assert_eq!(report.executive_summary.optimization_potential, OptimizationPotential::High);
        assert_eq!(report.key_metrics.high_utilization_count, 1);
        assert_eq!(report.key_metrics.low_utilization_count, 1);
        assert!((report.key_metrics.cost_efficiency_score - 4.0).abs() < 1e-9);
        assert_eq!(
            report.strategic_recommendations,
            vec![
                StrategicRecommendation::ConsolidateUnderutilized { count: 1 },
                StrategicRecommendation::NegotiateEnterpriseAgreements { count: 1 },
                StrategicRecommendation::RegularUtilizationReviews,
            ]
        );
        assert_eq!(
            report.strategic_recommendations[0].to_string(),
            "Consider consolidating 1 underutilized licenses"
        );
    }

    #[test]
    fn test_executive_on_empty_portfolio() {
        let report = report(&Portfolio::default());

        assert_eq!(report.executive_summary.average_utilization, 0.0);
        assert_eq!(report.key_metrics.cost_efficiency_score, 0.0);
        assert_eq!(
            report.strategic_recommendations,
            vec![StrategicRecommendation::RegularUtilizationReviews]
        );
    }
}
