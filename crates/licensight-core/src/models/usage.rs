//! Daily usage telemetry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of usage for one license.
///
/// `utilization_percentage` is not capped: over-provisioned days may exceed 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsagePoint {
    pub license_id: String,
    pub date: NaiveDate,
    pub units_used: f64,
    pub cost_incurred: f64,
    pub utilization_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_usage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_usage: Option<f64>,
}

impl UsagePoint {
    pub fn new(
        license_id: impl Into<String>,
        date: NaiveDate,
        units_used: f64,
        cost_incurred: f64,
        utilization_percentage: f64,
    ) -> Self {
        Self {
            license_id: license_id.into(),
            date,
            units_used,
            cost_incurred,
            utilization_percentage,
            peak_usage: None,
            average_usage: None,
        }
    }
}

/// Returns a copy of `series` in ascending date order.
///
/// The sort is stable, so the caller's order is preserved for equal dates.
pub fn sorted_by_date(series: &[UsagePoint]) -> Vec<UsagePoint> {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|point| point.date);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_date_orders_ascending() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let series = vec![
            UsagePoint::new("a", d(3), 3.0, 0.0, 30.0),
            UsagePoint::new("a", d(1), 1.0, 0.0, 10.0),
            UsagePoint::new("a", d(2), 2.0, 0.0, 20.0),
        ];

        let sorted = sorted_by_date(&series);
        let days: Vec<_> = sorted.iter().map(|p| p.date).collect();
        assert_eq!(days, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn test_usage_point_accepts_legacy_fields() {
        let json = r#"{
            "id": "x_usage_0",
            "license_id": "x",
            "date": "2024-05-01",
            "units_used": 10,
            "cost_incurred": 1.5,
            "utilization_percentage": 125.0,
            "peak_usage": 12.0,
            "metadata": {"generated": true}
        }"#;
        let point: UsagePoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.units_used, 10.0);
        assert_eq!(point.utilization_percentage, 125.0);
        assert_eq!(point.peak_usage, Some(12.0));
    }
}
