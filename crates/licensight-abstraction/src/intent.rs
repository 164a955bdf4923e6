//! Parsed user intents and the analysis requests derived from them.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use licensight_core::{LicenseRecord, UsagePoint};
use serde::{Deserialize, Serialize};

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Dashboard,
    Report,
    Analysis,
    Recommendation,
    Forecast,
    Comparison,
    Optimization,
    Greeting,
    Help,
    #[serde(other)]
    Unknown,
}

impl IntentCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Report => "report",
            Self::Analysis => "analysis",
            Self::Recommendation => "recommendation",
            Self::Forecast => "forecast",
            Self::Comparison => "comparison",
            Self::Optimization => "optimization",
            Self::Greeting => "greeting",
            Self::Help => "help",
            Self::Unknown => "unknown",
        }
    }

    /// Follow-up prompts worth offering after answering this category.
    pub const fn suggestions(self) -> &'static [&'static str] {
        match self {
            Self::Dashboard => &[
                "Generate an AP team report",
                "Show cost optimization opportunities",
                "Analyze utilization trends",
            ],
            Self::Report => &[
                "Generate a different team report",
                "Show detailed analysis",
                "Get cost optimization recommendations",
            ],
            Self::Analysis => &[
                "Generate a report based on this analysis",
                "Get recommendations for underperforming licenses",
                "Compare with other time periods",
            ],
            Self::Recommendation | Self::Optimization => &[
                "Generate a detailed implementation plan",
                "Show forecast for recommended changes",
                "Create a cost savings report",
            ],
            Self::Forecast => &[
                "Get recommendations based on forecasts",
                "Compare with historical trends",
                "Generate budget planning report",
            ],
            Self::Comparison => &[
                "Get recommendations for the best option",
                "Show detailed analysis of top performers",
                "Generate cost optimization plan",
            ],
            Self::Greeting | Self::Help | Self::Unknown => &[
                "Show me the dashboard",
                "Generate an AP team report",
                "What are the cost optimization opportunities?",
            ],
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user wants done within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentAction {
    #[default]
    Show,
    Generate,
    Compare,
    Analyze,
    Recommend,
    Forecast,
    Optimize,
    Explain,
    Greet,
    Help,
}

/// A time window mentioned in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimePeriod {
    /// The last `value` days up to `end_date`.
    Days { value: u32, start_date: NaiveDate, end_date: NaiveDate },
    Week { start_date: NaiveDate, end_date: NaiveDate },
    Month { start_date: NaiveDate, end_date: NaiveDate },
    /// Calendar quarter `value` (1-4) of `year`.
    Quarter { value: u32, year: i32 },
}

/// `days` before `today`, clamped to the earliest representable date.
fn days_before(today: NaiveDate, days: u32) -> NaiveDate {
    today.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN)
}

impl TimePeriod {
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        Self::Days { value: days, start_date: days_before(today, days), end_date: today }
    }

    pub fn last_week(today: NaiveDate) -> Self {
        Self::Week { start_date: days_before(today, 7), end_date: today }
    }

    /// Thirty days up to `today`.
    pub fn last_month(today: NaiveDate) -> Self {
        Self::Month { start_date: days_before(today, 30), end_date: today }
    }

    /// Inclusive date bounds; `None` for a quarter number outside 1-4.
    pub fn bounds(self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Days { start_date, end_date, .. }
            | Self::Week { start_date, end_date }
            | Self::Month { start_date, end_date } => Some((start_date, end_date)),
            Self::Quarter { value, year } => {
                if !(1..=4).contains(&value) {
                    return None;
                }
                let start = NaiveDate::from_ymd_opt(year, (value - 1) * 3 + 1, 1)?;
                let next = if value == 4 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(year, value * 3 + 1, 1)?
                };
                Some((start, next.pred_opt()?))
            }
        }
    }

    /// Quarter of `today`'s year.
    pub fn quarter(value: u32, today: NaiveDate) -> Self {
        Self::Quarter { value, year: today.year() }
    }
}

/// Things a message refers to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.time_period.is_none()
            && self.licenses.is_empty()
            && self.metrics.is_empty()
            && self.teams.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Summary,
    #[default]
    Standard,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Pdf,
    Excel,
}

/// How the answer should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub detail_level: DetailLevel,
    pub format: ReportFormat,
    pub include_visualizations: bool,
    pub include_forecasts: bool,
    pub include_recommendations: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Standard,
            format: ReportFormat::Json,
            include_visualizations: true,
            include_forecasts: false,
            include_recommendations: false,
        }
    }
}

/// A user message classified into a category and action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub category: IntentCategory,
    pub action: IntentAction,
    #[serde(default)]
    pub entities: Entities,
    #[serde(default)]
    pub parameters: Parameters,
    /// Classification confidence in [0, 1].
    pub confidence: f64,
    pub original_message: String,
}

/// Narrowing of the portfolio an intent asks about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Lowercase name fragments; empty means every license.
    pub licenses: Vec<String>,
    pub metrics: Vec<String>,
}

impl AnalysisRequest {
    pub fn from_intent(intent: &Intent) -> Self {
        let bounds = intent.entities.time_period.and_then(TimePeriod::bounds);
        Self {
            start_date: bounds.map(|(start, _)| start),
            end_date: bounds.map(|(_, end)| end),
            licenses: intent.entities.licenses.iter().map(|name| name.to_lowercase()).collect(),
            metrics: intent.entities.metrics.clone(),
        }
    }

    /// Whether `license` passes the name filter.
    ///
    /// Fragments match against the license id, name or vendor.
    pub fn matches_license(&self, license: &LicenseRecord) -> bool {
        if self.licenses.is_empty() {
            return true;
        }
        let haystacks =
            [license.id.to_lowercase(), license.name.to_lowercase(), license.vendor.to_lowercase()];
        self.licenses
            .iter()
            .any(|needle| haystacks.iter().any(|haystack| haystack.contains(needle.as_str())))
    }

    /// Usage points inside the requested window, bounds inclusive.
    pub fn filter_usage(&self, usage: &[UsagePoint]) -> Vec<UsagePoint> {
        usage
            .iter()
            .filter(|point| self.start_date.is_none_or(|start| point.date >= start))
            .filter(|point| self.end_date.is_none_or(|end| point.date <= end))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn intent(entities: Entities) -> Intent {
        Intent {
            category: IntentCategory::Analysis,
            action: IntentAction::Analyze,
            entities,
            parameters: Parameters::default(),
            confidence: 0.5,
            original_message: "analyze".to_string(),
        }
    }

    #[test]
    fn test_quarter_bounds() {
        assert_eq!(
            TimePeriod::Quarter { value: 1, year: 2024 }.bounds(),
            Some((date(2024, 1, 1), date(2024, 3, 31)))
        );
        assert_eq!(
            TimePeriod::Quarter { value: 4, year: 2024 }.bounds(),
            Some((date(2024, 10, 1), date(2024, 12, 31)))
        );
        assert_eq!(TimePeriod::Quarter { value: 5, year: 2024 }.bounds(), None);
    }

    #[test]
    fn test_last_days_clamps_to_earliest_date() {
        let today = date(2024, 6, 1);
        assert_eq!(
            TimePeriod::last_days(30, today).bounds(),
            Some((date(2024, 5, 2), today))
        );
        assert_eq!(
            TimePeriod::last_days(u32::MAX, today).bounds(),
            Some((NaiveDate::MIN, today))
        );
    }

    #[test]
    fn test_filter_usage_is_inclusive() {
        let today = date(2024, 6, 30);
        let usage: Vec<UsagePoint> = (0..30)
            .map(|i| UsagePoint::new("lic", today - Duration::days(i), 1.0, 1.0, 50.0))
            .collect();

        let request = AnalysisRequest::from_intent(&intent(Entities {
            time_period: Some(TimePeriod::last_week(today)),
            ..Entities::default()
        }));
        assert_eq!(request.filter_usage(&usage).len(), 8);

        let unbounded = AnalysisRequest::default();
        assert_eq!(unbounded.filter_usage(&usage).len(), 30);
    }

    #[test]
    fn test_unknown_category_deserializes() {
        let category: IntentCategory = serde_json::from_str("\"weather\"").unwrap();
        assert_eq!(category, IntentCategory::Unknown);
    }

    #[test]
    fn test_suggestions_cover_every_category() {
        let forecast = IntentCategory::Forecast.suggestions();
        assert_eq!(forecast[0], "Get recommendations based on forecasts");
        assert_eq!(IntentCategory::Unknown.suggestions().len(), 3);
    }
}
