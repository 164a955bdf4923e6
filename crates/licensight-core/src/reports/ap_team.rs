//! Accounts-payable report: renewals, budget and payment schedule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Reporter;
use crate::models::Decision;

/// Renewals within this many days are listed as upcoming.
const RENEWAL_WINDOW_DAYS: i64 = 90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApTeamReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
    pub cost_analysis: CostAnalysis,
    pub budget_impact: BudgetImpact,
    pub payment_schedule: Vec<ScheduledPayment>,
    pub cost_optimization_opportunities: Vec<OptimizationOpportunity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingRenewal {
    pub license_id: String,
    pub license_name: String,
    pub vendor: String,
    pub expiry_date: NaiveDate,
    pub days_to_expiry: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub total_annual: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetImpact {
    pub total: f64,
    pub monthly: f64,
    pub quarterly: f64,
}

/// Next payment of an auto-renewing contract, due at its end date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub license_name: String,
    pub next_payment_date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunity {
    pub license_name: String,
    pub potential_savings: f64,
    pub recommendation: Decision,
}

impl Reporter<'_> {
    pub fn ap_team(&self) -> ApTeamReport {
        let licenses = self.portfolio.licenses();

        let mut upcoming_renewals: Vec<UpcomingRenewal> = licenses
            .iter()
            .filter_map(|license| {
                let days_to_expiry = license.days_to_expiry(self.today);
                (0..=RENEWAL_WINDOW_DAYS).contains(&days_to_expiry).then(|| UpcomingRenewal {
                    license_id: license.id.clone(),
                    license_name: license.name.clone(),
                    vendor: license.vendor.clone(),
                    expiry_date: license.end_date,
                    days_to_expiry,
                    cost: license.total_cost,
                })
            })
            .collect();
        upcoming_renewals.sort_by_key(|renewal| renewal.days_to_expiry);

        let total_annual: f64 = licenses.iter().map(|license| license.annualized_cost()).sum();
        let monthly = total_annual / 12.0;

        let payment_schedule = licenses
            .iter()
            .filter(|license| license.auto_renewal)
            .map(|license| ScheduledPayment {
                license_name: license.name.clone(),
                next_payment_date: license.end_date,
                amount: license.total_cost,
            })
            .collect();

        let cost_optimization_opportunities = self
            .assessed
            .iter()
            .filter_map(|assessed| {
                let recommendation = &assessed.assessment.recommendation;
                let savings = recommendation.estimated_savings.filter(|&s| s > 0.0)?;
                Some(OptimizationOpportunity {
                    license_name: assessed.license.name.clone(),
                    potential_savings: savings,
                    recommendation: recommendation.recommendation,
                })
            })
            .collect();

        ApTeamReport {
            report_id: self.report_id("APR"),
            generated_at: self.generated_at,
            upcoming_renewals,
            cost_analysis: CostAnalysis { total_annual, monthly },
            budget_impact: BudgetImpact { total: total_annual, monthly, quarterly: monthly * 3.0 },
            payment_schedule,
            cost_optimization_opportunities,
        }
    }
}
