//! The license analytics engine.
//!
//! Data flows one way: a usage series is profiled by [`UtilizationAnalyzer`],
//! projected by [`ForecastingEngine`], and both results feed
//! [`RecommendationEngine`]. Every call is a pure function of its inputs and
//! the engine's `today` date.

pub mod analyzer;
pub mod forecast;
pub mod isolation_forest;
pub mod recommendation;
pub mod stats;

pub use analyzer::UtilizationAnalyzer;
pub use forecast::ForecastingEngine;
pub use isolation_forest::{IsolationForest, IsolationForestConfig};
pub use recommendation::{Assessment, RECOMMENDATION_HORIZON_DAYS, RecommendationEngine};
