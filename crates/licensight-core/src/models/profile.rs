//! Utilization analysis output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Direction of the least-squares cost line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTrend {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than two points were available.
    InsufficientData,
}

impl fmt::Display for CostTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient_data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub average_daily_cost: f64,
    pub cost_trend: CostTrend,
}

/// Mean utilization grouped by calendar period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageTrends {
    /// Month 1-12.
    pub monthly_pattern: BTreeMap<u32, f64>,
    /// ISO weekday, Monday = 1 through Sunday = 7.
    pub weekly_pattern: BTreeMap<u32, f64>,
    /// Quarter 1-4.
    pub quarterly_pattern: BTreeMap<u32, f64>,
    /// Compound per-step growth of the utilization sequence.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub utilization: f64,
    pub cost: f64,
    /// Isolation score in [-1, 0); more negative is more anomalous.
    pub anomaly_score: f64,
}

/// Month-over-month seasonality.
///
/// With fewer than 30 points only `insufficient_data` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub insufficient_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub monthly_pattern: BTreeMap<u32, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_month: Option<u32>,
}

impl Seasonality {
    pub fn insufficient() -> Self {
        Self {
            insufficient_data: true,
            strength: None,
            monthly_pattern: BTreeMap::new(),
            peak_month: None,
            low_month: None,
        }
    }
}

/// Statistical profile of one license's usage series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationProfile {
    pub total_records: usize,
    pub date_range: DateRange,
    pub utilization_stats: UtilizationStats,
    pub cost_analysis: CostSummary,
    pub usage_trends: UsageTrends,
    pub anomalies: Vec<Anomaly>,
    pub seasonality: Seasonality,
}
