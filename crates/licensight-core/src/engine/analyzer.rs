//! Utilization analysis over a single license's usage series.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::isolation_forest::{IsolationForest, IsolationForestConfig, standardize};
use super::stats;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{
    Anomaly, CostSummary, CostTrend, DateRange, Seasonality, UsagePoint, UsageTrends,
    UtilizationProfile, UtilizationStats, sorted_by_date,
};

/// Below this many points anomaly detection reports nothing.
pub const MIN_ANOMALY_POINTS: usize = 10;
/// Below this many points seasonality is reported as insufficient.
pub const MIN_SEASONALITY_POINTS: usize = 30;
/// Absolute cost slope per day separating a trend from noise.
const COST_SLOPE_THRESHOLD: f64 = 0.1;

/// Classifies the least-squares slope of `values` against their position.
pub fn cost_trend(values: &[f64]) -> CostTrend {
    if values.len() < 2 {
        return CostTrend::InsufficientData;
    }
    let slope = stats::least_squares_slope(values);
    if slope > COST_SLOPE_THRESHOLD {
        CostTrend::Increasing
    } else if slope < -COST_SLOPE_THRESHOLD {
        CostTrend::Decreasing
    } else {
        CostTrend::Stable
    }
}

fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Mean utilization per period key, keys ascending.
fn period_means(series: &[UsagePoint], key: impl Fn(NaiveDate) -> u32) -> BTreeMap<u32, f64> {
    let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for point in series {
        let entry = groups.entry(key(point.date)).or_default();
        entry.0 += point.utilization_percentage;
        entry.1 += 1;
    }
    groups.into_iter().map(|(k, (sum, count))| (k, sum / count as f64)).collect()
}

/// Key of the first maximum (or minimum, with `pick_low`) value.
fn extreme_key(pattern: &BTreeMap<u32, f64>, pick_low: bool) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for (&key, &value) in pattern {
        let better = match best {
            None => true,
            Some((_, current)) if pick_low => value < current,
            Some((_, current)) => value > current,
        };
        if better {
            best = Some((key, value));
        }
    }
    best.map(|(key, _)| key)
}

/// Computes [`UtilizationProfile`]s.
///
/// Stateless apart from the anomaly detector configuration, so one analyzer
/// can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct UtilizationAnalyzer {
    detector: IsolationForest,
}

impl UtilizationAnalyzer {
    pub fn new(anomaly: IsolationForestConfig) -> Self {
        Self { detector: IsolationForest::new(anomaly) }
    }

    /// Profiles `series`, which may arrive in any order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::EmptyInput`] when `series` is empty.
    pub fn analyze(&self, series: &[UsagePoint]) -> AnalyticsResult<UtilizationProfile> {
        let series = sorted_by_date(series);
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Err(AnalyticsError::EmptyInput);
        };
        let date_range = DateRange { start: first.date, end: last.date };

        let utilization: Vec<f64> = series.iter().map(|p| p.utilization_percentage).collect();
        let costs: Vec<f64> = series.iter().map(|p| p.cost_incurred).collect();

        let utilization_stats = UtilizationStats {
            mean: stats::mean(&utilization),
            median: stats::median(&utilization),
            std: stats::population_std(&utilization),
            min: utilization.iter().copied().fold(f64::INFINITY, f64::min),
            max: utilization.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        let cost_analysis = CostSummary {
            total_cost: costs.iter().sum(),
            average_daily_cost: stats::mean(&costs),
            cost_trend: cost_trend(&costs),
        };

        let usage_trends = UsageTrends {
            monthly_pattern: period_means(&series, |d| d.month()),
            weekly_pattern: period_means(&series, |d| d.weekday().number_from_monday()),
            quarterly_pattern: period_means(&series, quarter),
            growth_rate: stats::compound_growth_rate(&utilization),
        };

        let anomalies = self.detect_anomalies(&series);
        let seasonality = Self::detect_seasonality(&series, &utilization);

        debug!(
            license_id = %first.license_id,
            records = series.len(),
            mean_utilization = utilization_stats.mean,
            cost_trend = %cost_analysis.cost_trend,
            anomalies = anomalies.len(),
            "Analyzed utilization"
        );

        Ok(UtilizationProfile {
            total_records: series.len(),
            date_range,
            utilization_stats,
            cost_analysis,
            usage_trends,
            anomalies,
            seasonality,
        })
    }

    /// Expects `series` sorted by date.
    fn detect_anomalies(&self, series: &[UsagePoint]) -> Vec<Anomaly> {
        if series.len() < MIN_ANOMALY_POINTS {
            return Vec::new();
        }

        let features: Vec<Vec<f64>> = series
            .iter()
            .map(|p| vec![p.utilization_percentage, p.cost_incurred, p.units_used])
            .collect();
        let result = self.detector.fit_score(&standardize(&features));

        result
            .outliers
            .into_iter()
            .map(|i| Anomaly {
                date: series[i].date,
                utilization: series[i].utilization_percentage,
                cost: series[i].cost_incurred,
                anomaly_score: result.scores[i],
            })
            .collect()
    }

    fn detect_seasonality(series: &[UsagePoint], utilization: &[f64]) -> Seasonality {
        if series.len() < MIN_SEASONALITY_POINTS {
            return Seasonality::insufficient();
        }

        let monthly_pattern = period_means(series, |d| d.month());
        let monthly_means: Vec<f64> = monthly_pattern.values().copied().collect();
        let seasonal_variance = stats::sample_variance(&monthly_means);
        let overall_variance = stats::sample_variance(utilization);
        let strength =
            if overall_variance > 0.0 { seasonal_variance / overall_variance } else { 0.0 };

        Seasonality {
            insufficient_data: false,
            strength: Some(strength),
            peak_month: extreme_key(&monthly_pattern, false),
            low_month: extreme_key(&monthly_pattern, true),
            monthly_pattern,
        }
    }
}
