//! Renewal recommendation output.
//!
//! Reasons, risks and alternatives are reason codes with numeric payloads.
//! Their `Display` impls give an English rendering for presentation layers.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Renew,
    Cancel,
    Downgrade,
    Negotiate,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Renew => "renew",
            Self::Cancel => "cancel",
            Self::Downgrade => "downgrade",
            Self::Negotiate => "negotiate",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Why the decision came out the way it did, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Reason {
    LowUtilization { utilization: f64 },
    HighUtilization { utilization: f64 },
    ModerateUtilization { utilization: f64 },
    IncreasingCost,
    DecreasingCost,
    FrequentAnomalies { count: usize },
    ForecastIncrease,
    ForecastDecrease,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowUtilization { utilization } => {
                write!(f, "Low utilization ({utilization:.1}%) suggests over-provisioning")
            }
            Self::HighUtilization { utilization } => {
                write!(f, "High utilization ({utilization:.1}%) may require upgrade")
            }
            Self::ModerateUtilization { utilization } => {
                write!(f, "Moderate utilization ({utilization:.1}%) is within acceptable range")
            }
            Self::IncreasingCost => f.write_str("Increasing cost trend detected"),
            Self::DecreasingCost => f.write_str("Decreasing cost trend suggests good value"),
            Self::FrequentAnomalies { count } => {
                write!(f, "Multiple usage anomalies detected ({count})")
            }
            Self::ForecastIncrease => f.write_str("Forecast predicts significant usage increase"),
            Self::ForecastDecrease => f.write_str("Forecast predicts usage decrease"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RiskFactor {
    ServiceDegradation,
    BudgetPressure,
    OperationalIssues,
    ExpiresSoon { days_to_expiry: i64 },
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceDegradation => {
                f.write_str("High utilization may lead to service degradation")
            }
            Self::BudgetPressure => f.write_str("Increasing costs may impact budget"),
            Self::OperationalIssues => {
                f.write_str("Usage anomalies may indicate operational issues")
            }
            Self::ExpiresSoon { days_to_expiry } => write!(
                f,
                "License expires soon ({days_to_expiry} days) - urgent action required"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativeKind {
    PayPerUse,
    EnterpriseTier,
    MultiYearContract,
}

impl AlternativeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::PayPerUse => "Pay-per-use model",
            Self::EnterpriseTier => "Enterprise license",
            Self::MultiYearContract => "Multi-year contract",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PayPerUse => "Switch to usage-based billing to reduce costs",
            Self::EnterpriseTier => "Upgrade to enterprise license for better rates",
            Self::MultiYearContract => "Sign longer contract for better pricing",
        }
    }
}

/// An option other than the primary decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeOption {
    pub option: AlternativeKind,
    pub description: String,
    /// Negative values are cost increases.
    pub estimated_savings: f64,
}

impl AlternativeOption {
    pub fn new(option: AlternativeKind, estimated_savings: f64) -> Self {
        Self { option, description: option.description().to_string(), estimated_savings }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub license_id: String,
    pub recommendation: Decision,
    /// Within [0, 1].
    pub confidence: f64,
    pub reasoning: Vec<Reason>,
    pub estimated_savings: Option<f64>,
    pub risk_factors: Vec<RiskFactor>,
    pub alternative_options: Vec<AlternativeOption>,
    pub priority: Priority,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_as_code_with_payload() {
        let json = serde_json::to_value(Reason::LowUtilization { utilization: 12.5 }).unwrap();
        assert_eq!(json, serde_json::json!({"code": "low_utilization", "utilization": 12.5}));

        let json = serde_json::to_value(Reason::IncreasingCost).unwrap();
        assert_eq!(json, serde_json::json!({"code": "increasing_cost"}));
    }

    #[test]
    fn test_reason_display_names_percentage() {
        let text = Reason::HighUtilization { utilization: 95.04 }.to_string();
        assert!(text.contains("95.0%"));
    }

    #[test]
    fn test_alternative_carries_description() {
        let alt = AlternativeOption::new(AlternativeKind::EnterpriseTier, -200.0);
        assert_eq!(alt.description, AlternativeKind::EnterpriseTier.description());
        assert!(alt.estimated_savings < 0.0);
    }
}
