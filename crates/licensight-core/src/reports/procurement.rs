//! Procurement report: vendor spend and negotiation leverage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Reporter;
use crate::models::{Decision, Priority};

/// Minimum estimated savings for a cost-reduction entry.
const COST_REDUCTION_THRESHOLD: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub vendor_analysis: BTreeMap<String, VendorSummary>,
    pub contract_negotiation_opportunities: Vec<NegotiationOpportunity>,
    pub market_benchmarks: MarketBenchmarks,
    pub supplier_performance: BTreeMap<String, SupplierPerformance>,
    pub cost_reduction_recommendations: Vec<CostReduction>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VendorSummary {
    pub license_count: usize,
    pub total_cost: f64,
    /// License names, in portfolio order.
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOpportunity {
    pub license_name: String,
    pub vendor: String,
    pub decision: Decision,
    pub potential_savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBenchmarks {
    pub average_license_cost: f64,
    pub most_expensive_vendor: Option<String>,
    pub total_vendors: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplierPerformance {
    pub total_spend: f64,
    pub license_count: usize,
    pub average_license_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReduction {
    pub license_name: String,
    pub vendor: String,
    pub recommendation: Decision,
    pub potential_savings: f64,
    pub priority: Priority,
}

impl Reporter<'_> {
    pub fn procurement(&self) -> ProcurementReport {
        let licenses = self.portfolio.licenses();

        let mut vendor_analysis: BTreeMap<String, VendorSummary> = BTreeMap::new();
        for license in licenses {
            let vendor = vendor_analysis.entry(license.vendor.clone()).or_default();
            vendor.license_count += 1;
            vendor.total_cost += license.total_cost;
            vendor.licenses.push(license.name.clone());
        }

        let mut contract_negotiation_opportunities = Vec::new();
        let mut cost_reduction_recommendations = Vec::new();
        for assessed in &self.assessed {
            let recommendation = &assessed.assessment.recommendation;
            let savings = recommendation.estimated_savings.unwrap_or(0.0);

            if matches!(recommendation.recommendation, Decision::Negotiate | Decision::Downgrade) {
                contract_negotiation_opportunities.push(NegotiationOpportunity {
                    license_name: assessed.license.name.clone(),
                    vendor: assessed.license.vendor.clone(),
                    decision: recommendation.recommendation,
                    potential_savings: savings,
                });
            }
            if savings > COST_REDUCTION_THRESHOLD {
                cost_reduction_recommendations.push(CostReduction {
                    license_name: assessed.license.name.clone(),
                    vendor: assessed.license.vendor.clone(),
                    recommendation: recommendation.recommendation,
                    potential_savings: savings,
                    priority: recommendation.priority,
                });
            }
        }

        let average_license_cost = if licenses.is_empty() {
            0.0
        } else {
            self.portfolio.total_cost() / licenses.len() as f64
        };
        let mut most_expensive: Option<(&String, f64)> = None;
        for (name, vendor) in &vendor_analysis {
            if most_expensive.is_none_or(|(_, cost)| vendor.total_cost > cost) {
                most_expensive = Some((name, vendor.total_cost));
            }
        }

        let supplier_performance = vendor_analysis
            .iter()
            .map(|(name, vendor)| {
                let performance = SupplierPerformance {
                    total_spend: vendor.total_cost,
                    license_count: vendor.license_count,
                    average_license_cost: vendor.total_cost / vendor.license_count as f64,
                };
                (name.clone(), performance)
            })
            .collect();

        ProcurementReport {
            report_id: self.report_id("PR"),
            generated_at: self.generated_at,
            market_benchmarks: MarketBenchmarks {
                average_license_cost,
                most_expensive_vendor: most_expensive.map(|(name, _)| name.clone()),
                total_vendors: vendor_analysis.len(),
            },
            vendor_analysis,
            contract_negotiation_opportunities,
            supplier_performance,
            cost_reduction_recommendations,
        }
    }
}
