//! Software license contracts.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalyticsError, AnalyticsResult};

/// Pricing basis of a license contract.
///
/// Unrecognized strings deserialize to [`BillingModel::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingModel {
    PerUser,
    PerTask,
    PerStorage,
    PerCall,
    FlatRate,
    Tiered,
    Unknown,
}

/// How projected usage turns into projected cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostBasis {
    /// Cost scales with usage at `cost_per_unit`.
    PerUnit,
    /// Contract cost is spread evenly over the period.
    Flat,
}

impl BillingModel {
    /// Resolves the cost basis for forecasting.
    ///
    /// Fails with [`AnalyticsError::InvalidBillingModel`] for [`BillingModel::Unknown`];
    /// callers are expected to fall back to [`CostBasis::PerUnit`].
    pub fn cost_basis(self) -> AnalyticsResult<CostBasis> {
        match self {
            Self::FlatRate => Ok(CostBasis::Flat),
            Self::PerUser | Self::PerTask | Self::PerStorage | Self::PerCall | Self::Tiered => {
                Ok(CostBasis::PerUnit)
            }
            Self::Unknown => Err(AnalyticsError::InvalidBillingModel(self.to_string())),
        }
    }
}

impl FromStr for BillingModel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_user" => Self::PerUser,
            "per_task" => Self::PerTask,
            "per_storage" => Self::PerStorage,
            "per_call" | "per_api_call" => Self::PerCall,
            "flat_rate" => Self::FlatRate,
            "tiered" => Self::Tiered,
            _ => Self::Unknown,
        })
    }
}

impl<'de> Deserialize<'de> for BillingModel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let Ok(model) = raw.parse::<Self>();
        Ok(model)
    }
}

impl fmt::Display for BillingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PerUser => "per_user",
            Self::PerTask => "per_task",
            Self::PerStorage => "per_storage",
            Self::PerCall => "per_call",
            Self::FlatRate => "flat_rate",
            Self::Tiered => "tiered",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Expired,
    PendingRenewal,
    Cancelled,
}

/// A license contract as supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: String,
    pub name: String,
    pub vendor: String,
    #[serde(alias = "billing_type")]
    pub billing_model: BillingModel,
    pub cost_per_unit: f64,
    #[serde(alias = "total_license_cost")]
    pub total_cost: f64,
    #[serde(alias = "license_period_months")]
    pub period_months: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LicenseStatus,
    #[serde(default)]
    pub max_units: Option<u64>,
    #[serde(default)]
    pub current_units: Option<u64>,
    #[serde(default)]
    pub auto_renewal: bool,
}

impl LicenseRecord {
    /// Contract cost normalized to twelve months.
    ///
    /// A zero-month period is treated as one month.
    pub fn annualized_cost(&self) -> f64 {
        self.total_cost * 12.0 / f64::from(self.period_months.max(1))
    }

    /// Flat daily cost used for flat-rate contracts (30-day months).
    pub fn flat_daily_cost(&self) -> f64 {
        self.total_cost / (f64::from(self.period_months.max(1)) * 30.0)
    }

    /// Signed number of days from `today` until the contract ends.
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }

    /// Ratio of current to maximum units, when both are known and `max_units > 0`.
    pub fn capacity_ratio(&self) -> Option<f64> {
        match (self.current_units, self.max_units) {
            (Some(current), Some(max)) if max > 0 && current > 0 => {
                Some(current as f64 / max as f64)
            }
            _ => None,
        }
    }
}
