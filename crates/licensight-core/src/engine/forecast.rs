//! Daily usage and cost forecasting.

use std::f64::consts::PI;

use chrono::{Datelike, Days, NaiveDate, Utc};
use tracing::{debug, warn};

use super::stats;
use crate::models::{
    CostBasis, ForecastPoint, ForecastTrend, LicenseRecord, SeasonalFactors, UsagePoint,
    sorted_by_date,
};

/// Below this many points the forecast is a flat mean with flat confidence.
pub const MIN_TREND_POINTS: usize = 7;
/// Minimum points before a leading window is compared with the trailing one.
const MIN_SLOPE_POINTS: usize = 14;
const TREND_WINDOW: usize = 7;

const BASE_CONFIDENCE: f64 = 0.8;
const SPARSE_CONFIDENCE: f64 = 0.3;
const CONFIDENCE_DECAY: f64 = 0.95;
const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.95;

/// Relative change separating an upward or downward forecast from a stable one.
const TREND_CHANGE_THRESHOLD: f64 = 0.1;

/// Projects usage and cost forward from a license's history.
///
/// Forecast dates start the day after [`ForecastingEngine::today`].
#[derive(Debug, Clone)]
pub struct ForecastingEngine {
    today: NaiveDate,
}

impl Default for ForecastingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastingEngine {
    /// Engine anchored at the current UTC date.
    pub fn new() -> Self {
        Self { today: Utc::now().date_naive() }
    }

    /// Engine anchored at a fixed date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Forecasts `horizon_days` days, one point per day in ascending date order.
    ///
    /// Returns an empty forecast when `series` is empty; days past
    /// `NaiveDate::MAX` are dropped.
    pub fn forecast(
        &self,
        series: &[UsagePoint],
        license: &LicenseRecord,
        horizon_days: usize,
    ) -> Vec<ForecastPoint> {
        if series.is_empty() || horizon_days == 0 {
            return Vec::new();
        }

        let units: Vec<f64> = sorted_by_date(series).iter().map(|p| p.units_used).collect();
        let usage = project_usage(&units, horizon_days);
        let costs = project_costs(&usage, license);
        let trend = forecast_trend(&units, &usage);

        debug!(
            license_id = %license.id,
            history = units.len(),
            horizon_days,
            trend = %trend,
            "Generated forecast"
        );

        usage
            .iter()
            .zip(&costs)
            .enumerate()
            .map_while(|(i, (&predicted_usage, &predicted_cost))| {
                let forecast_date = self.today.checked_add_days(Days::new(i as u64 + 1))?;
                Some(ForecastPoint {
                    license_id: license.id.clone(),
                    forecast_date,
                    predicted_usage,
                    predicted_cost,
                    confidence_score: confidence(&units, i),
                    trend,
                    seasonal_factors: seasonal_factors(forecast_date),
                })
            })
            .collect()
    }
}

/// 30-day cycle applied to the usage projection.
fn cycle_factor(day: usize) -> f64 {
    1.0 + 0.1 * (2.0 * PI * day as f64 / 30.0).sin()
}

/// Projects units used for each day of the horizon.
///
/// `units` must be in ascending date order and non-empty.
fn project_usage(units: &[f64], days: usize) -> Vec<f64> {
    let n = units.len();
    if n < MIN_TREND_POINTS {
        return vec![stats::mean(units); days];
    }

    let window = TREND_WINDOW.min(n / 2);
    let recent = stats::mean(&units[n - window..]);
    let trend = if n >= MIN_SLOPE_POINTS {
        (recent - stats::mean(&units[..window])) / n as f64
    } else {
        0.0
    };

    (0..days).map(|i| (recent + trend * (i + 1) as f64) * cycle_factor(i)).collect()
}

fn project_costs(usage: &[f64], license: &LicenseRecord) -> Vec<f64> {
    let basis = license.billing_model.cost_basis().unwrap_or_else(|err| {
        warn!(license_id = %license.id, error = %err, "Falling back to per-unit cost projection");
        CostBasis::PerUnit
    });

    match basis {
        CostBasis::Flat => vec![license.flat_daily_cost(); usage.len()],
        CostBasis::PerUnit => usage.iter().map(|u| u * license.cost_per_unit).collect(),
    }
}

/// Confidence for forecast day `day` (0-indexed).
fn confidence(units: &[f64], day: usize) -> f64 {
    if units.len() < MIN_TREND_POINTS {
        return SPARSE_CONFIDENCE;
    }

    let mean = stats::mean(units);
    let consistency = if mean > 0.0 { 1.0 - stats::sample_std(units) / mean } else { 0.5 };
    let decayed = BASE_CONFIDENCE * CONFIDENCE_DECAY.powi(day as i32);

    (decayed * consistency).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Compares the last week of history with the first week of the forecast.
fn forecast_trend(units: &[f64], forecast: &[f64]) -> ForecastTrend {
    if units.len() < MIN_TREND_POINTS || forecast.is_empty() {
        return ForecastTrend::Stable;
    }

    let recent = stats::mean(&units[units.len() - TREND_WINDOW..]);
    let ahead = stats::mean(&forecast[..forecast.len().min(TREND_WINDOW)]);
    let change = if recent > 0.0 { (ahead - recent) / recent } else { 0.0 };

    if change > TREND_CHANGE_THRESHOLD {
        ForecastTrend::Upward
    } else if change < -TREND_CHANGE_THRESHOLD {
        ForecastTrend::Downward
    } else {
        ForecastTrend::Stable
    }
}

/// Monthly and weekly factors for a forecast date; weekdays count from Monday = 0.
pub fn seasonal_factors(date: NaiveDate) -> SeasonalFactors {
    let month = f64::from(date.month() - 1);
    let weekday = f64::from(date.weekday().num_days_from_monday());
    SeasonalFactors {
        monthly: 1.0 + 0.1 * (2.0 * PI * month / 12.0).sin(),
        weekly: 1.0 + 0.05 * (2.0 * PI * weekday / 7.0).sin(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::{BillingModel, LicenseStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn license(billing_model: BillingModel) -> LicenseRecord {
        LicenseRecord {
            id: "lic".to_string(),
            name: "Tool".to_string(),
            vendor: "Vendor".to_string(),
            billing_model,
            cost_per_unit: 2.0,
            total_cost: 3_600.0,
            period_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            status: LicenseStatus::Active,
            max_units: None,
            current_units: None,
            auto_renewal: false,
        }
    }

    fn history(units: &[f64]) -> Vec<UsagePoint> {
        units
            .iter()
            .enumerate()
            .map(|(i, &u)| {
                let date = today() - Duration::days((units.len() - i) as i64);
                UsagePoint::new("lic", date, u, u, 50.0)
            })
            .collect()
    }

    #[test]
    fn test_empty_history_yields_empty_forecast() {
        let engine = ForecastingEngine::with_today(today());
        assert!(engine.forecast(&[], &license(BillingModel::PerUser), 30).is_empty());
    }

    #[test]
    fn test_short_history_is_flat_mean_with_low_confidence() {
        let engine = ForecastingEngine::with_today(today());
        let points =
            engine.forecast(&history(&[2.0, 4.0, 6.0]), &license(BillingModel::PerTask), 5);

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.predicted_usage == 4.0));
        assert!(points.iter().all(|p| p.predicted_cost == 8.0));
        assert!(points.iter().all(|p| p.confidence_score == 0.3));
        assert!(points.iter().all(|p| p.trend == ForecastTrend::Stable));
    }

    #[test]
    fn test_dates_start_tomorrow_and_ascend() {
        let engine = ForecastingEngine::with_today(today());
        let points = engine.forecast(&history(&[10.0; 20]), &license(BillingModel::PerUser), 10);

        assert_eq!(points[0].forecast_date, today() + Duration::days(1));
        assert!(
            points
                .windows(2)
                .all(|w| w[1].forecast_date == w[0].forecast_date + Duration::days(1))
        );
    }

    #[test]
    fn test_horizon_stops_at_last_representable_date() {
        let last_days = NaiveDate::MAX.checked_sub_days(Days::new(3)).unwrap();
        let engine = ForecastingEngine::with_today(last_days);
        let points = engine.forecast(&history(&[10.0; 20]), &license(BillingModel::PerUser), 10);

        assert_eq!(points.len(), 3);
        assert_eq!(points[2].forecast_date, NaiveDate::MAX);
    }

    #[test]
    fn test_flat_rate_spreads_contract_cost() {
        let engine = ForecastingEngine::with_today(today());
        let points = engine.forecast(&history(&[10.0; 20]), &license(BillingModel::FlatRate), 3);
        assert!(points.iter().all(|p| (p.predicted_cost - 10.0).abs() < 1e-9));
    }

    #[test]
    fn test_unknown_billing_model_falls_back_to_per_unit() {
        let engine = ForecastingEngine::with_today(today());
        let points = engine.forecast(&history(&[10.0; 20]), &license(BillingModel::Unknown), 1);
        assert!((points[0].predicted_cost - points[0].predicted_usage * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_history_projects_cycle_around_baseline() {
        let usage = project_usage(&[10.0; 20], 31);
        assert!((usage[0] - 10.0).abs() < 1e-9);
        assert!(usage[7] > 10.0);
        assert!(usage[22] < 10.0);
        assert!((usage[30] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_growing_history_has_positive_trend() {
        let units: Vec<f64> = (0..28).map(|i| 10.0 + f64::from(i)).collect();
        let usage = project_usage(&units, 1);
        // Trailing mean 34, leading mean 13, trend 21/28.
        assert!((usage[0] - (34.0 + 0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_decays_and_stays_bounded() {
        let units: Vec<f64> = (0..30).map(|i| 10.0 + f64::from(i % 3)).collect();
        let scores: Vec<f64> = (0..90).map(|day| confidence(&units, day)).collect();
        assert!(scores.windows(2).all(|w| w[1] <= w[0]));
        assert!(scores.iter().all(|s| (0.1..=0.95).contains(s)));
        assert_eq!(scores[89], 0.1);
    }

    #[test]
    fn test_zero_mean_history_uses_half_consistency() {
        assert!((confidence(&[0.0; 10], 0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_trend_labels() {
        let units = [10.0; 14];
        assert_eq!(forecast_trend(&units, &[12.0; 7]), ForecastTrend::Upward);
        assert_eq!(forecast_trend(&units, &[8.0; 7]), ForecastTrend::Downward);
        assert_eq!(forecast_trend(&units, &[10.5; 3]), ForecastTrend::Stable);
        assert_eq!(forecast_trend(&[0.0; 14], &[5.0; 7]), ForecastTrend::Stable);
    }

    #[test]
    fn test_seasonal_factors_for_monday_in_january() {
        let factors = seasonal_factors(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!((factors.monthly - 1.0).abs() < 1e-12);
        assert!((factors.weekly - 1.0).abs() < 1e-12);

        let april = seasonal_factors(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert!((april.monthly - 1.1).abs() < 1e-12);
    }
}
