//! Renewal recommendations.
//!
//! The decision is built in four passes over the analysis and forecast, each
//! of which may override the previous one: utilization band, cost trend,
//! anomaly count, forecast direction.

use chrono::NaiveDate;
use tracing::debug;

use super::analyzer::UtilizationAnalyzer;
use super::forecast::ForecastingEngine;
use super::stats;
use crate::error::AnalyticsResult;
use crate::models::{
    AlternativeKind, AlternativeOption, CostTrend, Decision, ForecastPoint, LicenseRecord,
    Priority, Reason, Recommendation, RiskFactor, UsagePoint, UtilizationProfile,
};

/// Forecast horizon used when recommending.
pub const RECOMMENDATION_HORIZON_DAYS: usize = 90;

const MAX_CONFIDENCE: f64 = 0.95;
const MIN_ANOMALY_CONFIDENCE: f64 = 0.3;

/// Profile, forecast and recommendation computed together for one license.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub profile: UtilizationProfile,
    pub forecast: Vec<ForecastPoint>,
    pub recommendation: Recommendation,
}

/// Synthesizes renewal decisions from utilization analysis and forecasting.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    analyzer: UtilizationAnalyzer,
    forecaster: ForecastingEngine,
}

impl RecommendationEngine {
    pub fn new(analyzer: UtilizationAnalyzer, forecaster: ForecastingEngine) -> Self {
        Self { analyzer, forecaster }
    }

    /// Engine with the default analyzer, anchored at a fixed date.
    pub fn with_today(today: NaiveDate) -> Self {
        Self::new(UtilizationAnalyzer::default(), ForecastingEngine::with_today(today))
    }

    pub fn today(&self) -> NaiveDate {
        self.forecaster.today()
    }

    pub fn analyzer(&self) -> &UtilizationAnalyzer {
        &self.analyzer
    }

    pub fn forecaster(&self) -> &ForecastingEngine {
        &self.forecaster
    }

    /// Recommends what to do with `license` at renewal.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalyticsError::EmptyInput`] when `series` is empty;
    /// no forecast is attempted in that case.
    pub fn recommend(
        &self,
        license: &LicenseRecord,
        series: &[UsagePoint],
    ) -> AnalyticsResult<Recommendation> {
        self.assess(license, series).map(|assessment| assessment.recommendation)
    }

    /// Like [`RecommendationEngine::recommend`], also returning the
    /// intermediate profile and 90-day forecast.
    pub fn assess(
        &self,
        license: &LicenseRecord,
        series: &[UsagePoint],
    ) -> AnalyticsResult<Assessment> {
        let profile = self.analyzer.analyze(series)?;
        let forecast = self.forecaster.forecast(series, license, RECOMMENDATION_HORIZON_DAYS);

        let utilization = profile.utilization_stats.mean;
        let (decision, confidence, reasoning) = evaluate(&profile, &forecast);
        let estimated_savings = estimate_savings(license, decision, &forecast);
        let risk_factors = identify_risks(license, &profile, self.today());
        let alternative_options = suggest_alternatives(license, utilization);
        let priority = determine_priority(confidence, estimated_savings, &risk_factors);

        debug!(
            license_id = %license.id,
            decision = %decision,
            confidence,
            priority = %priority,
            risks = risk_factors.len(),
            "Generated recommendation"
        );

        let recommendation = Recommendation {
            license_id: license.id.clone(),
            recommendation: decision,
            confidence,
            reasoning,
            estimated_savings,
            risk_factors,
            alternative_options,
            priority,
        };

        Ok(Assessment { profile, forecast, recommendation })
    }
}

fn evaluate(
    profile: &UtilizationProfile,
    forecast: &[ForecastPoint],
) -> (Decision, f64, Vec<Reason>) {
    let utilization = profile.utilization_stats.mean;
    let mut reasoning = Vec::new();

    // Utilization band
    let (mut decision, mut confidence): (Decision, f64) = if utilization < 30.0 {
        reasoning.push(Reason::LowUtilization { utilization });
        if utilization < 20.0 { (Decision::Cancel, 0.9) } else { (Decision::Downgrade, 0.8) }
    } else if utilization > 90.0 {
        reasoning.push(Reason::HighUtilization { utilization });
        (Decision::Negotiate, 0.8)
    } else {
        reasoning.push(Reason::ModerateUtilization { utilization });
        (Decision::Renew, 0.7)
    };

    // Cost trend
    match profile.cost_analysis.cost_trend {
        CostTrend::Increasing => {
            reasoning.push(Reason::IncreasingCost);
            if decision == Decision::Renew {
                decision = Decision::Negotiate;
                confidence = (confidence + 0.1).min(MAX_CONFIDENCE);
            }
        }
        CostTrend::Decreasing => {
            reasoning.push(Reason::DecreasingCost);
            confidence = (confidence + 0.05).min(MAX_CONFIDENCE);
        }
        CostTrend::Stable | CostTrend::InsufficientData => {}
    }

    // Anomalies
    let anomalies = profile.anomalies.len();
    if anomalies > 3 {
        reasoning.push(Reason::FrequentAnomalies { count: anomalies });
        confidence = (confidence - 0.1).max(MIN_ANOMALY_CONFIDENCE);
    }

    // Forecast direction
    if !forecast.is_empty() {
        let usage: Vec<f64> = forecast.iter().map(|p| p.predicted_usage).collect();
        let overall = stats::mean(&usage);
        let baseline = if usage.len() >= 7 { stats::mean(&usage[..7]) } else { overall };

        if overall > baseline * 1.2 {
            reasoning.push(Reason::ForecastIncrease);
            if decision == Decision::Cancel {
                decision = Decision::Renew;
            }
        } else if overall < baseline * 0.8 {
            reasoning.push(Reason::ForecastDecrease);
            if decision == Decision::Renew {
                decision = Decision::Downgrade;
            }
        }
    }

    (decision, confidence, reasoning)
}

/// Annual savings implied by `decision`; `None` without a forecast.
fn estimate_savings(
    license: &LicenseRecord,
    decision: Decision,
    forecast: &[ForecastPoint],
) -> Option<f64> {
    if forecast.is_empty() {
        return None;
    }

    let annual = license.annualized_cost();
    let savings = match decision {
        Decision::Cancel => annual,
        Decision::Downgrade => annual * 0.3,
        Decision::Negotiate => annual * 0.15,
        Decision::Renew => 0.0,
    };
    Some(savings)
}

fn identify_risks(
    license: &LicenseRecord,
    profile: &UtilizationProfile,
    today: NaiveDate,
) -> Vec<RiskFactor> {
    let mut risks = Vec::new();

    if profile.utilization_stats.mean > 85.0 {
        risks.push(RiskFactor::ServiceDegradation);
    }
    if profile.cost_analysis.cost_trend == CostTrend::Increasing {
        risks.push(RiskFactor::BudgetPressure);
    }
    if profile.anomalies.len() > 2 {
        risks.push(RiskFactor::OperationalIssues);
    }

    let days_to_expiry = license.days_to_expiry(today);
    if days_to_expiry < 30 {
        risks.push(RiskFactor::ExpiresSoon { days_to_expiry });
    }

    risks
}

/// Alternatives priced as fractions of the contract cost.
fn suggest_alternatives(license: &LicenseRecord, utilization: f64) -> Vec<AlternativeOption> {
    let mut alternatives = Vec::new();
    let cost = license.total_cost;

    if utilization < 50.0 {
        alternatives.push(AlternativeOption::new(AlternativeKind::PayPerUse, cost * 0.4));
    }
    if utilization > 80.0 {
        alternatives.push(AlternativeOption::new(AlternativeKind::EnterpriseTier, -cost * 0.2));
    }
    alternatives.push(AlternativeOption::new(AlternativeKind::MultiYearContract, cost * 0.1));

    alternatives
}

fn determine_priority(confidence: f64, savings: Option<f64>, risks: &[RiskFactor]) -> Priority {
    let savings = savings.unwrap_or(0.0);
    if risks.len() > 2 || savings > 10_000.0 {
        Priority::High
    } else if confidence > 0.8 || savings > 5_000.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::models::{BillingModel, LicenseStatus};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn license(total_cost: f64, end_in_days: i64) -> LicenseRecord {
        LicenseRecord {
            id: "lic".to_string(),
            name: "Tool".to_string(),
            vendor: "Vendor".to_string(),
            billing_model: BillingModel::PerUser,
            cost_per_unit: 1.0,
            total_cost,
            period_months: 12,
            start_date: today() - Duration::days(300),
            end_date: today() + Duration::days(end_in_days),
            status: LicenseStatus::Active,
            max_units: Some(100),
            current_units: Some(50),
            auto_renewal: true,
        }
    }

    fn flat_series(utilization: f64, days: i64) -> Vec<UsagePoint> {
        (0..days)
            .map(|i| {
                let date = today() - Duration::days(days - i);
                UsagePoint::new("lic", date, 20.0, 5.0, utilization)
            })
            .collect()
    }

    #[test]
    fn test_empty_series_propagates_error() {
        let engine = RecommendationEngine::with_today(today());
        let err = engine.recommend(&license(1_000.0, 200), &[]).unwrap_err();
        assert_eq!(err, AnalyticsError::EmptyInput);
    }

    #[test]
    fn test_utilization_bands() {
        let engine = RecommendationEngine::with_today(today());
        let lic = license(1_000.0, 200);
        let decide = |u| engine.recommend(&lic, &flat_series(u, 60)).unwrap();

        let cancel = decide(10.0);
        assert_eq!(cancel.recommendation, Decision::Cancel);
        assert_eq!(cancel.confidence, 0.9);

        let downgrade = decide(25.0);
        assert_eq!(downgrade.recommendation, Decision::Downgrade);
        assert_eq!(downgrade.estimated_savings, Some(300.0));

        let renew = decide(60.0);
        assert_eq!(renew.recommendation, Decision::Renew);
        assert_eq!(renew.confidence, 0.7);
        assert_eq!(renew.estimated_savings, Some(0.0));
        assert_eq!(renew.priority, Priority::Low);
    }

    fn cost_series(costs: &[f64]) -> Vec<UsagePoint> {
        let days = costs.len() as i64;
        costs
            .iter()
            .enumerate()
            .map(|(i, &cost)| {
                let date = today() - Duration::days(days - i as i64);
                UsagePoint::new("lic", date, 20.0, cost, 60.0)
            })
            .collect()
    }

    #[test]
    fn test_cost_trend_adjusts_confidence() {
        let engine = RecommendationEngine::with_today(today());
        let lic = license(1_000.0, 200);

        let rising: Vec<f64> = (1..=9).map(f64::from).collect();
        let negotiate = engine.recommend(&lic, &cost_series(&rising)).unwrap();
        assert_eq!(negotiate.recommendation, Decision::Negotiate);
        assert!((negotiate.confidence - 0.8).abs() < 1e-9);
        assert!(negotiate.reasoning.contains(&Reason::IncreasingCost));
        assert!((negotiate.estimated_savings.unwrap() - 150.0).abs() < 1e-9);

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        let renew = engine.recommend(&lic, &cost_series(&falling)).unwrap();
        assert_eq!(renew.recommendation, Decision::Renew);
        assert!((renew.confidence - 0.75).abs() < 1e-9);
        assert!(renew.reasoning.contains(&Reason::DecreasingCost));
    }

    #[test]
    fn test_urgency_risk_near_expiry() {
        let engine = RecommendationEngine::with_today(today());
        let rec = engine.recommend(&license(1_000.0, 10), &flat_series(60.0, 30)).unwrap();
        assert_eq!(rec.risk_factors, vec![RiskFactor::ExpiresSoon { days_to_expiry: 10 }]);
    }

    #[test]
    fn test_alternatives_by_utilization() {
        let lic = license(1_000.0, 200);
        let low: Vec<_> = suggest_alternatives(&lic, 30.0).iter().map(|a| a.option).collect();
        assert_eq!(low, vec![AlternativeKind::PayPerUse, AlternativeKind::MultiYearContract]);

        let high = suggest_alternatives(&lic, 85.0);
        assert_eq!(high[0].option, AlternativeKind::EnterpriseTier);
        assert_eq!(high[0].estimated_savings, -200.0);
        assert_eq!(high[1].estimated_savings, 100.0);
    }

    #[test]
    fn test_priority_rules() {
        let risks = vec![
            RiskFactor::ServiceDegradation,
            RiskFactor::BudgetPressure,
            RiskFactor::OperationalIssues,
        ];
        assert_eq!(determine_priority(0.1, None, &risks), Priority::High);
        assert_eq!(determine_priority(0.5, Some(12_000.0), &[]), Priority::High);
        assert_eq!(determine_priority(0.9, Some(0.0), &[]), Priority::Medium);
        assert_eq!(determine_priority(0.5, Some(6_000.0), &[]), Priority::Medium);
        assert_eq!(determine_priority(0.8, Some(100.0), &[]), Priority::Low);
    }

    #[test]
    fn test_savings_absent_without_forecast() {
        assert_eq!(estimate_savings(&license(1_000.0, 200), Decision::Cancel, &[]), None);
    }
}
