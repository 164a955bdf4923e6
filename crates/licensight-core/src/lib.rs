//! Licensight Core - software license utilization analytics.
//!
//! This crate provides:
//! - The analytics engine: utilization profiling, usage and cost
//!   forecasting, renewal recommendations
//! - The license and usage data model
//! - JSON-file persistence and portfolio reports
//! - Configuration loading
//!
//! # Example
//!
//! ```rust,no_run
//! use licensight_core::{LicenseStore, RecommendationEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = LicenseStore::open("data")?;
//!     let license = store.require_license("slack_001")?;
//!     let usage = store.usage_for(&license.id)?;
//!
//!     let recommendation = RecommendationEngine::default().recommend(&license, &usage)?;
//!     println!("{}: {}", license.name, recommendation.recommendation);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod reports;
pub mod store;

pub use config::{AssistantConfig, ConfigError, LicensightConfig};
pub use engine::{
    Assessment, ForecastingEngine, IsolationForestConfig, RecommendationEngine,
    UtilizationAnalyzer,
};
pub use error::{AnalyticsError, AnalyticsResult};
pub use models::{
    BillingModel, Decision, ForecastPoint, ForecastTrend, LicenseRecord, LicenseStatus, Priority,
    Recommendation, UsagePoint, UtilizationProfile,
};
pub use reports::{Portfolio, Reporter};
pub use store::{LicenseStore, StoreError, StoreResult};
