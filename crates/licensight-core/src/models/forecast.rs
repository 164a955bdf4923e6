//! Forecast output.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of projected usage against recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastTrend {
    Upward,
    Downward,
    Stable,
}

impl fmt::Display for ForecastTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Upward => "upward",
            Self::Downward => "downward",
            Self::Stable => "stable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    pub monthly: f64,
    pub weekly: f64,
}

/// Projection for a single future day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub license_id: String,
    pub forecast_date: NaiveDate,
    pub predicted_usage: f64,
    pub predicted_cost: f64,
    /// Always within [0.1, 0.95].
    pub confidence_score: f64,
    pub trend: ForecastTrend,
    pub seasonal_factors: SeasonalFactors,
}
