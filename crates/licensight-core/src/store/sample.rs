//! Demonstration contracts and generated usage.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{BillingModel, LicenseRecord, LicenseStatus, UsagePoint};

pub(super) const HISTORY_DAYS: i64 = 90;

struct Template {
    id: &'static str,
    name: &'static str,
    vendor: &'static str,
    billing_model: BillingModel,
    cost_per_unit: f64,
    total_cost: f64,
    max_units: Option<u64>,
    current_units: Option<u64>,
    /// Days from today until the contract ends.
    ends_in: i64,
}

const TEMPLATES: [Template; 6] = [
    Template {
        id: "workato_001",
        name: "Workato Integration Platform",
        vendor: "Workato",
        billing_model: BillingModel::PerTask,
        cost_per_unit: 0.15,
        total_cost: 50_000.0,
        max_units: Some(1_000_000),
        current_units: Some(750_000),
        ends_in: 45,
    },
    Template {
        id: "slack_001",
        name: "Slack Business+",
        vendor: "Slack",
        billing_model: BillingModel::PerUser,
        cost_per_unit: 12.50,
        total_cost: 15_000.0,
        max_units: Some(1_200),
        current_units: Some(950),
        ends_in: 120,
    },
    Template {
        id: "aws_001",
        name: "AWS Enterprise Support",
        vendor: "Amazon Web Services",
        billing_model: BillingModel::Tiered,
        cost_per_unit: 0.0,
        total_cost: 25_000.0,
        max_units: None,
        current_units: None,
        ends_in: 20,
    },
    Template {
        id: "salesforce_001",
        name: "Salesforce Enterprise",
        vendor: "Salesforce",
        billing_model: BillingModel::PerUser,
        cost_per_unit: 150.0,
        total_cost: 180_000.0,
        max_units: Some(1_200),
        current_units: Some(800),
        ends_in: 200,
    },
    Template {
        id: "zoom_001",
        name: "Zoom Pro",
        vendor: "Zoom",
        billing_model: BillingModel::PerUser,
        cost_per_unit: 14.99,
        total_cost: 18_000.0,
        max_units: Some(1_200),
        current_units: Some(1_200),
        ends_in: 75,
    },
    Template {
        id: "jira_001",
        name: "Jira Software",
        vendor: "Atlassian",
        billing_model: BillingModel::PerUser,
        cost_per_unit: 7.75,
        total_cost: 9_300.0,
        max_units: Some(1_200),
        current_units: Some(400),
        ends_in: 15,
    },
];

/// Twelve-month contracts ending at staggered offsets from `today`.
pub(super) fn licenses(today: NaiveDate) -> Vec<LicenseRecord> {
    TEMPLATES
        .iter()
        .map(|t| {
            let end_date = today + Duration::days(t.ends_in);
            LicenseRecord {
                id: t.id.to_string(),
                name: t.name.to_string(),
                vendor: t.vendor.to_string(),
                billing_model: t.billing_model,
                cost_per_unit: t.cost_per_unit,
                total_cost: t.total_cost,
                period_months: 12,
                start_date: end_date - Duration::days(364),
                end_date,
                status: LicenseStatus::Active,
                max_units: t.max_units,
                current_units: t.current_units,
                auto_renewal: true,
            }
        })
        .collect()
}

/// Daily usage for each license over the [`HISTORY_DAYS`] days before `today`.
pub(super) fn usage(licenses: &[LicenseRecord], today: NaiveDate, seed: u64) -> Vec<UsagePoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = today - Duration::days(HISTORY_DAYS);
    let mut points = Vec::with_capacity(licenses.len() * HISTORY_DAYS as usize);

    for license in licenses {
        for day in 0..HISTORY_DAYS {
            let units = match license.billing_model {
                // Task volume spikes every seventh day and drifts upward.
                BillingModel::PerTask => {
                    let weekly_spike = if day % 7 == 0 { 1.3 } else { 1.0 };
                    let drift = 1.0 + 0.1 * (day as f64 / 7.0);
                    (8_000.0 * weekly_spike * drift * rng.gen_range(0.8..1.2)).floor()
                }
                BillingModel::PerUser => {
                    let seats = license.current_units.unwrap_or(500) as f64;
                    (seats * rng.gen_range(0.95..1.05)).floor()
                }
                _ => 1.0,
            };

            let utilization = match license.max_units {
                Some(max) if max > 0 => units / max as f64 * 100.0,
                _ => rng.gen_range(20.0..80.0),
            };

            let cost = match license.billing_model {
                BillingModel::PerTask => units * license.cost_per_unit,
                _ => license.total_cost / 365.0,
            };

            let mut point = UsagePoint::new(
                license.id.clone(),
                start + Duration::days(day),
                units,
                cost,
                utilization,
            );
            point.peak_usage = Some(units * 1.2);
            point.average_usage = Some(units * 0.9);
            points.push(point);
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
    }

    #[test]
    fn test_usage_is_deterministic_per_seed() {
        let licenses = licenses(today());
        assert_eq!(usage(&licenses, today(), 7), usage(&licenses, today(), 7));
        assert_ne!(usage(&licenses, today(), 7), usage(&licenses, today(), 8));
    }

    #[test]
    fn test_usage_covers_ninety_days_before_today() {
        let licenses = licenses(today());
        let points = usage(&licenses, today(), 1);
        assert_eq!(points.len(), 6 * 90);

        let first = points.iter().map(|p| p.date).min().unwrap();
        let last = points.iter().map(|p| p.date).max().unwrap();
        assert_eq!(first, today() - Duration::days(90));
        assert_eq!(last, today() - Duration::days(1));
    }

    #[test]
    fn test_contracts_span_a_year() {
        for license in licenses(today()) {
            assert_eq!((license.end_date - license.start_date).num_days(), 364);
            assert_eq!(license.period_months, 12);
        }
    }
}
