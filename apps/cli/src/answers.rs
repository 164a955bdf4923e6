//! Chat replies built from engine output.
//!
//! Data-backed categories are answered here from the portfolio; greetings,
//! help and unrecognized messages are left to the assistant.

use chrono::{DateTime, Utc};
use licensight_abstraction::{AnalysisRequest, Intent, IntentCategory};
use licensight_core::{
    ForecastTrend, LicenseRecord, Portfolio, Priority, RecommendationEngine, Reporter, UsagePoint,
};

use crate::format::{dollars, percent, ratio};

/// Entries listed per section before the reply is cut short.
const TOP_ENTRIES: usize = 3;
const MAX_RECOMMENDATIONS: usize = 5;
/// Average utilization under which a license is called out as under-used.
const UNDERUSED_UTILIZATION: f64 = 30.0;

pub struct Responder<'a> {
    portfolio: &'a Portfolio,
    engine: &'a RecommendationEngine,
    horizon_days: usize,
    generated_at: DateTime<Utc>,
}

impl<'a> Responder<'a> {
    pub fn new(
        portfolio: &'a Portfolio,
        engine: &'a RecommendationEngine,
        horizon_days: usize,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self { portfolio, engine, horizon_days, generated_at }
    }

    /// Reply for a data-backed intent; `None` for greeting, help and unknown.
    pub fn answer(&self, intent: &Intent) -> Option<String> {
        let request = AnalysisRequest::from_intent(intent);
        let lines = match intent.category {
            IntentCategory::Dashboard => self.dashboard(),
            IntentCategory::Report => self.report(intent),
            IntentCategory::Analysis => self.analysis(&request),
            IntentCategory::Recommendation | IntentCategory::Optimization => {
                self.recommendations(&request)
            }
            IntentCategory::Forecast => self.forecast(&request),
            IntentCategory::Comparison => self.comparison(&request),
            IntentCategory::Greeting | IntentCategory::Help | IntentCategory::Unknown => {
                return None;
            }
        };
        Some(lines.join("\n"))
    }

    /// Licenses passing the name filter, with usage inside the window.
    ///
    /// Licenses left without usage are dropped.
    fn selection(&self, request: &AnalysisRequest) -> Vec<(&'a LicenseRecord, Vec<UsagePoint>)> {
        self.portfolio
            .licenses()
            .iter()
            .filter(|license| request.matches_license(license))
            .map(|license| (license, request.filter_usage(&self.portfolio.usage_for(&license.id))))
            .filter(|(_, usage)| !usage.is_empty())
            .collect()
    }

    fn reporter(&self) -> Reporter<'a> {
        Reporter::new(self.portfolio, self.engine, self.generated_at)
    }

    fn dashboard(&self) -> Vec<String> {
        let dashboard = self.reporter().dashboard();
        let mut lines = vec![
            "Here's your current license dashboard:".to_string(),
            String::new(),
            "Overview:".to_string(),
            format!("• Total licenses: {}", dashboard.total_licenses),
            format!("• Total cost: {}", dollars(dashboard.total_cost)),
            format!("• Average utilization: {}", percent(dashboard.avg_utilization)),
        ];

        let mut savings: Vec<_> =
            dashboard.recommendations.iter().filter(|row| row.estimated_savings > 0.0).collect();
        savings.sort_by(|a, b| b.estimated_savings.total_cmp(&a.estimated_savings));
        if !savings.is_empty() {
            lines.push(String::new());
            lines.push("Key insights:".to_string());
            for row in savings.into_iter().take(TOP_ENTRIES) {
                lines.push(format!(
                    "• {}: {} could save {}",
                    row.license_name,
                    row.recommendation,
                    dollars(row.estimated_savings)
                ));
            }
        }
        lines
    }

    fn report(&self, intent: &Intent) -> Vec<String> {
        match intent.entities.teams.first().map(String::as_str) {
            Some("ap") => self.ap_team_report(),
            Some("procurement") => self.procurement_report(),
            Some("executive") => self.executive_report(),
            _ => self.summary_report(),
        }
    }

    fn ap_team_report(&self) -> Vec<String> {
        let report = self.reporter().ap_team();
        let budget = &report.budget_impact;
        let mut lines = vec![
            format!("AP team report generated ({})", report.report_id),
            String::new(),
            "Budget impact:".to_string(),
            format!("• Annual cost: {}", dollars(budget.total)),
            format!("• Monthly cost: {}", dollars(budget.monthly)),
            format!("• Quarterly cost: {}", dollars(budget.quarterly)),
            String::new(),
        ];

        if report.upcoming_renewals.is_empty() {
            lines.push("No urgent renewals in the next 90 days".to_string());
        } else {
            lines.push(format!("Upcoming renewals ({}):", report.upcoming_renewals.len()));
            for renewal in report.upcoming_renewals.iter().take(TOP_ENTRIES) {
                lines.push(format!(
                    "• {}: {} (expires in {} days)",
                    renewal.license_name,
                    dollars(renewal.cost),
                    renewal.days_to_expiry
                ));
            }
        }
        lines
    }

    fn procurement_report(&self) -> Vec<String> {
        let report = self.reporter().procurement();
        let mut lines = vec![
            format!("Procurement report generated ({})", report.report_id),
            String::new(),
            format!("Vendor analysis ({} vendors):", report.vendor_analysis.len()),
        ];

        let mut vendors: Vec<_> = report.vendor_analysis.iter().collect();
        vendors.sort_by(|(_, a), (_, b)| b.total_cost.total_cmp(&a.total_cost));
        for (vendor, summary) in vendors.into_iter().take(TOP_ENTRIES) {
            lines.push(format!(
                "• {}: {} licenses, {}",
                vendor,
                summary.license_count,
                dollars(summary.total_cost)
            ));
        }

        let opportunities = &report.contract_negotiation_opportunities;
        if !opportunities.is_empty() {
            lines.push(String::new());
            lines.push(format!("Negotiation opportunities ({}):", opportunities.len()));
            for opportunity in opportunities.iter().take(TOP_ENTRIES) {
                lines.push(format!(
                    "• {}: {} (saves {})",
                    opportunity.license_name,
                    opportunity.decision,
                    dollars(opportunity.potential_savings)
                ));
            }
        }
        lines
    }

    fn executive_report(&self) -> Vec<String> {
        let report = self.reporter().executive();
        let summary = &report.executive_summary;
        let mut lines = vec![
            format!("Executive summary report generated ({})", report.report_id),
            String::new(),
            "Key metrics:".to_string(),
            format!("• Total software spend: {}", dollars(summary.total_software_spend)),
            format!("• License count: {}", summary.license_count),
            format!("• Average utilization: {}", percent(summary.average_utilization)),
            format!("• Optimization potential: {}", summary.optimization_potential),
            String::new(),
            "Strategic recommendations:".to_string(),
        ];
        lines.extend(
            report
                .strategic_recommendations
                .iter()
                .take(TOP_ENTRIES)
                .map(|recommendation| format!("• {}", recommendation)),
        );
        lines
    }

    fn summary_report(&self) -> Vec<String> {
        let report = self.reporter().license_summary();
        let mut lines = vec![
            format!("Report generated ({})", report.report_id),
            String::new(),
            "Summary:".to_string(),
            format!("• Total licenses: {}", report.total_licenses),
            format!("• Total cost: {}", dollars(report.total_cost)),
            format!("• Average utilization: {}", percent(report.total_utilization)),
        ];

        let mut recommendations: Vec<_> = report
            .recommendations
            .iter()
            .filter_map(|r| r.estimated_savings.filter(|&s| s > 0.0).map(|s| (r, s)))
            .collect();
        recommendations.sort_by(|(_, a), (_, b)| b.total_cmp(a));
        if !recommendations.is_empty() {
            lines.push(String::new());
            lines.push("Key insights:".to_string());
            for (recommendation, savings) in recommendations.into_iter().take(TOP_ENTRIES) {
                lines.push(format!(
                    "• {}: {} could save {}",
                    recommendation.license_id,
                    recommendation.recommendation,
                    dollars(savings)
                ));
            }
        }
        lines
    }

    fn analysis(&self, request: &AnalysisRequest) -> Vec<String> {
        let focus = if request.metrics.is_empty() {
            "general".to_string()
        } else {
            request.metrics.join(", ")
        };
        let mut lines = vec![
            "Analysis complete".to_string(),
            String::new(),
            format!("Focus: {}", focus),
            format!("Time period: {}", describe_window(request)),
        ];

        let analyzer = self.engine.analyzer();
        let results: Vec<(&LicenseRecord, f64)> = self
            .selection(request)
            .into_iter()
            .filter_map(|(license, usage)| {
                let profile = analyzer.analyze(&usage).ok()?;
                Some((license, profile.utilization_stats.mean))
            })
            .collect();
        if results.is_empty() {
            lines.push(String::new());
            lines.push("No usage data matched your request.".to_string());
            return lines;
        }

        lines.push(String::new());
        lines.push("Analysis results:".to_string());
        for (license, mean) in &results {
            lines.push(format!("• {}: {} average utilization", license.name, percent(*mean)));
        }

        let underused = results.iter().filter(|(_, mean)| *mean < UNDERUSED_UTILIZATION).count();
        if underused > 0 {
            lines.push(String::new());
            lines.push(format!(
                "{} of {} licenses average below {} utilization",
                underused,
                results.len(),
                percent(UNDERUSED_UTILIZATION)
            ));
        }
        lines
    }

    fn recommendations(&self, request: &AnalysisRequest) -> Vec<String> {
        let recommendations: Vec<_> = self
            .selection(request)
            .into_iter()
            .filter_map(|(license, usage)| {
                self.engine.recommend(license, &usage).ok().map(|r| (license, r))
            })
            .collect();
        if recommendations.is_empty() {
            return vec!["No usage data matched your request.".to_string()];
        }

        let total_savings: f64 = recommendations
            .iter()
            .filter_map(|(_, r)| r.estimated_savings)
            .filter(|&s| s > 0.0)
            .sum();
        let mut lines = vec![
            "Recommendations generated".to_string(),
            String::new(),
            format!("Total potential savings: {}", dollars(total_savings)),
        ];

        let urgent: Vec<_> =
            recommendations.iter().filter(|(_, r)| r.priority == Priority::High).collect();
        if !urgent.is_empty() {
            lines.push(String::new());
            lines.push("High priority actions:".to_string());
            for (license, recommendation) in urgent.into_iter().take(TOP_ENTRIES) {
                lines.push(format!(
                    "• {}: {} (saves {})",
                    license.name,
                    recommendation.recommendation,
                    dollars(recommendation.estimated_savings.unwrap_or(0.0))
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!("All recommendations ({}):", recommendations.len()));
        for (license, recommendation) in recommendations.iter().take(MAX_RECOMMENDATIONS) {
            lines.push(format!(
                "[{}] {}: {}",
                recommendation.priority, license.name, recommendation.recommendation
            ));
        }
        lines
    }

    fn forecast(&self, request: &AnalysisRequest) -> Vec<String> {
        let forecaster = self.engine.forecaster();
        let forecasts: Vec<_> = self
            .selection(request)
            .into_iter()
            .map(|(license, usage)| {
                (license, forecaster.forecast(&usage, license, self.horizon_days))
            })
            .filter(|(_, forecast)| !forecast.is_empty())
            .collect();
        if forecasts.is_empty() {
            return vec!["No usage data matched your request.".to_string()];
        }

        let count = |trend: ForecastTrend| {
            forecasts.iter().filter(|(_, forecast)| forecast[0].trend == trend).count()
        };
        // Ties resolve to the later entry, so stable wins them.
        let dominant = [ForecastTrend::Downward, ForecastTrend::Upward, ForecastTrend::Stable]
            .into_iter()
            .max_by_key(|&trend| count(trend))
            .unwrap_or(ForecastTrend::Stable);

        let mut lines = vec![
            "Forecast analysis complete".to_string(),
            String::new(),
            format!("Forecast horizon: {} days", self.horizon_days),
            format!("Overall trend: {}", dominant),
            String::new(),
            "License forecasts:".to_string(),
        ];

        let mut confidences = Vec::with_capacity(forecasts.len());
        for (license, forecast) in &forecasts {
            let n = forecast.len() as f64;
            let usage = forecast.iter().map(|p| p.predicted_usage).sum::<f64>() / n;
            let cost = forecast.iter().map(|p| p.predicted_cost).sum::<f64>() / n;
            let confidence = forecast.iter().map(|p| p.confidence_score).sum::<f64>() / n;
            confidences.push(confidence);
            lines.push(format!(
                "• {}: {:.0} usage, ${:.0} daily cost (confidence: {})",
                license.name,
                usage,
                cost,
                ratio(confidence)
            ));
        }

        let overall = confidences.iter().sum::<f64>() / confidences.len() as f64;
        lines.push(String::new());
        lines.push(format!("Overall forecast confidence: {}", ratio(overall)));
        lines
    }

    fn comparison(&self, request: &AnalysisRequest) -> Vec<String> {
        let rows: Vec<ComparisonRow> = self
            .selection(request)
            .into_iter()
            .map(|(license, usage)| ComparisonRow::new(license, &usage))
            .collect();
        if rows.is_empty() {
            return vec!["No usage data matched your request.".to_string()];
        }

        let mut lines = vec![
            "Comparison analysis complete".to_string(),
            String::new(),
            format!("Licenses compared: {}", rows.len()),
            String::new(),
            "Comparison results:".to_string(),
        ];
        for row in &rows {
            lines.push(format!(
                "• {}: {} cost, {} utilization",
                row.name,
                dollars(row.cost),
                percent(row.utilization)
            ));
        }

        if let Some(best) = rows.iter().max_by(|a, b| a.efficiency.total_cmp(&b.efficiency)) {
            lines.push(String::new());
            lines.push(format!(
                "Most efficient: {} (efficiency score: {:.2})",
                best.name, best.efficiency
            ));
        }
        if rows.len() >= 2 {
            if let Some(priciest) = rows.iter().max_by(|a, b| a.cost.total_cmp(&b.cost)) {
                lines.push(format!(
                    "{} is the most expensive at {}",
                    priciest.name,
                    dollars(priciest.cost)
                ));
            }
        }
        lines
    }
}

/// One license in a side-by-side comparison.
struct ComparisonRow {
    name: String,
    /// Cost incurred over the compared window.
    cost: f64,
    utilization: f64,
    /// Mean utilization per thousand dollars spent; zero without spend.
    efficiency: f64,
}

impl ComparisonRow {
    fn new(license: &LicenseRecord, usage: &[UsagePoint]) -> Self {
        let cost: f64 = usage.iter().map(|p| p.cost_incurred).sum();
        let utilization = usage.iter().map(|p| p.utilization_percentage).sum::<f64>()
            / usage.len().max(1) as f64;
        let efficiency = if cost > 0.0 { utilization / (cost / 1000.0) } else { 0.0 };
        Self { name: license.name.clone(), cost, utilization, efficiency }
    }
}

fn describe_window(request: &AnalysisRequest) -> String {
    match (request.start_date, request.end_date) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        (Some(start), None) => format!("since {}", start),
        (None, Some(end)) => format!("until {}", end),
        (None, None) => "all time".to_string(),
    }
}
