//! Data model: contract and usage inputs, engine outputs.

pub mod forecast;
pub mod license;
pub mod profile;
pub mod recommendation;
pub mod usage;

pub use forecast::{ForecastPoint, ForecastTrend, SeasonalFactors};
pub use license::{BillingModel, CostBasis, LicenseRecord, LicenseStatus};
pub use profile::{
    Anomaly, CostSummary, CostTrend, DateRange, Seasonality, UsageTrends, UtilizationProfile,
    UtilizationStats,
};
pub use recommendation::{
    AlternativeKind, AlternativeOption, Decision, Priority, Reason, Recommendation, RiskFactor,
};
pub use usage::{sorted_by_date, UsagePoint};
