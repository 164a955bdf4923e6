//! End-to-end tests of the analytics engine.

use chrono::{Duration, NaiveDate};
use licensight_core::engine::forecast::seasonal_factors;
use licensight_core::models::{AlternativeKind, Reason, RiskFactor};
use licensight_core::{
    AnalyticsError, BillingModel, Decision, ForecastingEngine, LicenseRecord, LicenseStatus,
    LicenseStore, RecommendationEngine, UsagePoint, UtilizationAnalyzer,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 30).unwrap()
}

fn license(total_cost: f64) -> LicenseRecord {
    LicenseRecord {
        id: "crm".to_string(),
        name: "CRM Suite".to_string(),
        vendor: "Acme".to_string(),
        billing_model: BillingModel::PerUser,
        cost_per_unit: 10.0,
        total_cost,
        period_months: 12,
        start_date: today() - Duration::days(200),
        end_date: today() + Duration::days(165),
        status: LicenseStatus::Active,
        max_units: Some(100),
        current_units: Some(50),
        auto_renewal: true,
    }
}

/// 90 days ending yesterday, built from a per-day generator.
fn series(f: impl Fn(i64) -> (f64, f64, f64)) -> Vec<UsagePoint> {
    (0..90)
        .map(|i| {
            let (units, cost, utilization) = f(i);
            UsagePoint::new("crm", today() - Duration::days(90 - i), units, cost, utilization)
        })
        .collect()
}

fn sample_store() -> (tempfile::TempDir, LicenseStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store = LicenseStore::open(dir.path()).unwrap();
    store.seed_sample_data(today(), 42).unwrap();
    (dir, store)
}

#[test]
fn test_flat_low_utilization_recommends_cancel() {
    let engine = RecommendationEngine::with_today(today());
    let lic = license(24_000.0);
    let rec = engine.recommend(&lic, &series(|_| (15.0, 5.0, 15.0))).unwrap();

    assert_eq!(rec.recommendation, Decision::Cancel);
    assert!(rec.confidence >= 0.8);
    assert_eq!(rec.estimated_savings, Some(lic.annualized_cost()));
    assert_eq!(rec.reasoning, vec![Reason::LowUtilization { utilization: 15.0 }]);
    assert!(rec.risk_factors.is_empty());

    let alternatives: Vec<_> = rec.alternative_options.iter().map(|a| a.option).collect();
    assert_eq!(alternatives, vec![AlternativeKind::PayPerUse, AlternativeKind::MultiYearContract]);
}

#[test]
fn test_saturated_license_with_rising_cost_recommends_negotiate() {
    let engine = RecommendationEngine::with_today(today());
    let lic = license(12_000.0);
    let usage = series(|i| (95.0, if i < 45 { 10.0 } else { 20.0 }, 95.0));

    let profile = UtilizationAnalyzer::default().analyze(&usage).unwrap();
    assert!(profile.anomalies.is_empty());

    let rec = engine.recommend(&lic, &usage).unwrap();
    assert_eq!(rec.recommendation, Decision::Negotiate);
    assert!(rec.confidence >= 0.8);
    assert!(rec.reasoning.contains(&Reason::HighUtilization { utilization: 95.0 }));
    assert!(rec.reasoning.contains(&Reason::IncreasingCost));
    assert!(rec.risk_factors.contains(&RiskFactor::ServiceDegradation));
    assert!(rec.risk_factors.contains(&RiskFactor::BudgetPressure));
    assert_eq!(rec.estimated_savings, Some(12_000.0 * 0.15));
}

#[test]
fn test_empty_series_fails_everywhere() {
    let engine = RecommendationEngine::with_today(today());
    assert_eq!(UtilizationAnalyzer::default().analyze(&[]), Err(AnalyticsError::EmptyInput));
    assert_eq!(engine.recommend(&license(1_000.0), &[]), Err(AnalyticsError::EmptyInput));
    assert!(engine.forecaster().forecast(&[], &license(1_000.0), 90).is_empty());
}

#[test]
fn test_moderate_rising_cost_converts_renew_to_negotiate() {
    let engine = RecommendationEngine::with_today(today());
    let usage = series(|i| (60.0, if i < 45 { 10.0 } else { 20.0 }, 60.0));
    let rec = engine.recommend(&license(1_000.0), &usage).unwrap();

    assert_eq!(rec.recommendation, Decision::Negotiate);
    assert!((rec.confidence - 0.8).abs() < 1e-9);
}

#[test]
fn test_decreasing_cost_raises_confidence() {
    let engine = RecommendationEngine::with_today(today());
    let usage = series(|i| (60.0, if i < 45 { 20.0 } else { 10.0 }, 60.0));
    let rec = engine.recommend(&license(1_000.0), &usage).unwrap();

    assert_eq!(rec.recommendation, Decision::Renew);
    assert!(rec.reasoning.contains(&Reason::DecreasingCost));
    assert!((rec.confidence - 0.75).abs() < 1e-9);
}

#[test]
fn test_frequent_anomalies_lower_confidence() {
    let engine = RecommendationEngine::with_today(today());
    let usage = series(|i| {
        let x = i as f64;
        let utilization = 60.0 + 12.0 * (x * 1.3).sin() + 5.0 * (x * 0.7).cos();
        (utilization, 5.0 + 0.01 * ((i * 7) % 11) as f64, utilization)
    });

    let assessment = engine.assess(&license(1_000.0), &usage).unwrap();
    let anomalies = assessment.profile.anomalies.len();
    assert!(anomalies > 3);

    let rec = assessment.recommendation;
    assert!(rec.reasoning.contains(&Reason::FrequentAnomalies { count: anomalies }));
    assert!(rec.risk_factors.contains(&RiskFactor::OperationalIssues));
    assert!(rec.confidence < 0.7);
}

#[test]
fn test_over_provisioned_utilization_is_not_capped() {
    let analyzer = UtilizationAnalyzer::default();
    let usage = series(|i| (130.0, 5.0, 110.0 + (i % 3) as f64 * 10.0));

    let profile = analyzer.analyze(&usage).unwrap();
    assert!((profile.utilization_stats.mean - 120.0).abs() < 1e-9);
    assert_eq!(profile.utilization_stats.max, 130.0);

    let engine = RecommendationEngine::with_today(today());
    let rec = engine.recommend(&license(1_000.0), &usage).unwrap();
    assert_eq!(rec.recommendation, Decision::Negotiate);
    assert!(rec.risk_factors.contains(&RiskFactor::ServiceDegradation));
    assert!(rec.alternative_options.iter().any(|a| a.option == AlternativeKind::EnterpriseTier));
}

#[test]
fn test_analysis_properties_hold_for_sample_data() {
    let (_dir, store) = sample_store();
    let analyzer = UtilizationAnalyzer::default();

    for lic in store.licenses().unwrap() {
        let usage = store.usage_for(&lic.id).unwrap();
        let profile = analyzer.analyze(&usage).unwrap();
        let stats = profile.utilization_stats;

        assert_eq!(profile.total_records, 90);
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!(!profile.seasonality.insufficient_data);
        assert!(profile.seasonality.strength.is_some());
        assert!(profile.anomalies.iter().all(|a| a.anomaly_score < 0.0));
    }
}

#[test]
fn test_forecast_properties_hold_for_sample_data() {
    let (_dir, store) = sample_store();
    let engine = ForecastingEngine::with_today(today());

    for lic in store.licenses().unwrap() {
        let usage = store.usage_for(&lic.id).unwrap();
        for horizon in [1, 7, 45] {
            let points = engine.forecast(&usage, &lic, horizon);
            assert_eq!(points.len(), horizon);
            assert_eq!(points[0].forecast_date, today() + Duration::days(1));
            assert!(points.windows(2).all(|w| w[0].forecast_date < w[1].forecast_date));
            assert!(points.windows(2).all(|w| w[1].confidence_score <= w[0].confidence_score));
            assert!(points.iter().all(|p| (0.1..=0.95).contains(&p.confidence_score)));
            assert!(points.iter().all(|p| p.seasonal_factors == seasonal_factors(p.forecast_date)));
        }
    }
}

#[test]
fn test_engine_calls_are_idempotent() {
    let (_dir, store) = sample_store();
    let engine = RecommendationEngine::with_today(today());

    for lic in store.licenses().unwrap() {
        let mut usage = store.usage_for(&lic.id).unwrap();
        let first = engine.assess(&lic, &usage).unwrap();

        usage.reverse();
        let second = engine.assess(&lic, &usage).unwrap();

        assert_eq!(first.profile, second.profile);
        assert_eq!(first.forecast, second.forecast);
        assert_eq!(first.recommendation, second.recommendation);
        assert!((0.0..=1.0).contains(&first.recommendation.confidence));
    }
}

#[test]
fn test_priority_is_high_with_many_risks() {
    let engine = RecommendationEngine::with_today(today());
    let mut lic = license(1_000.0);
    lic.end_date = today() + Duration::days(5);
    let usage = series(|i| (95.0, 5.0 + i as f64, 95.0));

    let rec = engine.recommend(&lic, &usage).unwrap();
    assert!(rec.risk_factors.len() > 2);
    assert_eq!(rec.priority, licensight_core::Priority::High);
}
