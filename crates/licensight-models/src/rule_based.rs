//! Deterministic, pattern-based assistant.
//!
//! Always available: it needs no network and gives the same answer for the
//! same message, so it closes every fallback chain.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use licensight_abstraction::{
    Assistant, AssistantError, ConversationContext, DetailLevel, Entities, Intent, IntentAction,
    IntentCategory, Parameters, ReplyKind, ReportFormat, TimePeriod,
};
use regex::{Regex, RegexSet};
use tracing::debug;

/// Score added per matching category pattern before normalization.
const PATTERN_WEIGHT: f64 = 0.1;

const METRICS: [&str; 6] = ["cost", "usage", "utilization", "spending", "budget", "efficiency"];

fn set(patterns: &[&str]) -> RegexSet {
    RegexSet::new(patterns).expect("intent patterns should be valid")
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("intent pattern should be valid")
}

/// Checked in order; on equal scores the earlier category wins.
static CATEGORY_PATTERNS: LazyLock<Vec<(IntentCategory, RegexSet)>> = LazyLock::new(|| {
    vec![
        (
            IntentCategory::Dashboard,
            set(&[
                r"show.*dashboard",
                r"dashboard",
                r"overview",
                r"summary",
                r"main.*page",
                r"home",
                r"current.*status",
            ]),
        ),
        (
            IntentCategory::Report,
            set(&[
                r"generate.*report",
                r"create.*report",
                r"report",
                r"ap.*report",
                r"procurement.*report",
                r"financial.*report",
                r"quarterly.*report",
                r"monthly.*report",
                r"annual.*report",
                r"custom.*report",
            ]),
        ),
        (
            IntentCategory::Analysis,
            set(&[
                r"analyze",
                r"analysis",
                r"trends",
                r"patterns",
                r"insights",
                r"what.*happening",
                r"how.*performing",
                r"usage.*analysis",
            ]),
        ),
        (
            IntentCategory::Recommendation,
            set(&[
                r"recommend",
                r"suggest",
                r"what.*should",
                r"optimize",
                r"save.*money",
                r"reduce.*cost",
                r"cut.*cost",
                r"which.*cancel",
                r"which.*renew",
            ]),
        ),
        (
            IntentCategory::Forecast,
            set(&[
                r"forecast",
                r"predict",
                r"future",
                r"projection",
                r"next.*month",
                r"next.*quarter",
                r"next.*year",
                r"what.*will.*happen",
            ]),
        ),
        (
            IntentCategory::Comparison,
            set(&[
                r"compare",
                r"vs",
                r"versus",
                r"difference",
                r"better",
                r"worse",
                r"which.*better",
                r"which.*cheaper",
                r"which.*more.*efficient",
            ]),
        ),
        (
            IntentCategory::Greeting,
            set(&[
                r"hello",
                r"hi",
                r"hey",
                r"good.*morning",
                r"good.*afternoon",
                r"good.*evening",
                r"how.*are.*you",
                r"what.*can.*you.*do",
            ]),
        ),
        (
            IntentCategory::Help,
            set(&[
                r"help",
                r"what.*can.*you",
                r"how.*to",
                r"guide",
                r"tutorial",
                r"commands",
                r"features",
                r"capabilities",
            ]),
        ),
    ]
});

/// First action with any matching pattern wins.
static ACTION_PATTERNS: LazyLock<Vec<(IntentAction, RegexSet)>> = LazyLock::new(|| {
    vec![
        (IntentAction::Show, set(&[r"show", r"display", r"view", r"see"])),
        (IntentAction::Generate, set(&[r"generate", r"create", r"make", r"build"])),
        (IntentAction::Compare, set(&[r"compare", r"vs", r"versus", r"against"])),
        (IntentAction::Analyze, set(&[r"analyze", r"analysis", r"examine", r"study"])),
        (IntentAction::Recommend, set(&[r"recommend", r"suggest", r"advise", r"propose"])),
        (IntentAction::Forecast, set(&[r"forecast", r"predict", r"project", r"estimate"])),
        (IntentAction::Optimize, set(&[r"optimize", r"improve", r"enhance", r"maximize"])),
        (IntentAction::Explain, set(&[r"explain", r"describe", r"tell.*about", r"what.*is"])),
        (IntentAction::Greet, set(&[r"hello", r"hi", r"hey", r"good.*morning"])),
        (IntentAction::Help, set(&[r"help", r"assist", r"guide", r"support"])),
    ]
});

static TEAM_PATTERNS: LazyLock<Vec<(&'static str, RegexSet)>> = LazyLock::new(|| {
    vec![
        ("ap", set(&[r"ap.*team", r"accounts.*payable"])),
        ("procurement", set(&[r"procurement", r"purchasing"])),
        ("finance", set(&[r"finance", r"financial"])),
        ("executive", set(&[r"executive", r"cfo", r"cto", r"management"])),
    ]
});

static LAST_DAYS: LazyLock<Regex> = LazyLock::new(|| regex(r"last\D*?(\d+)\s*days?"));
static LAST_WEEK: LazyLock<Regex> = LazyLock::new(|| regex(r"last.*week"));
static LAST_MONTH: LazyLock<Regex> = LazyLock::new(|| regex(r"last.*month"));
static QUARTER: LazyLock<Regex> = LazyLock::new(|| regex(r"q([1-4])"));
static DETAILED: LazyLock<Regex> = LazyLock::new(|| regex(r"detailed|comprehensive|full"));
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| regex(r"summary|brief|overview"));
static PDF: LazyLock<Regex> = LazyLock::new(|| regex(r"pdf|document"));
static EXCEL: LazyLock<Regex> = LazyLock::new(|| regex(r"excel|spreadsheet"));
static NO_VISUALS: LazyLock<Regex> =
    LazyLock::new(|| regex(r"no.*chart|no.*graph|no.*visual"));
static WANTS_FORECAST: LazyLock<Regex> = LazyLock::new(|| regex(r"forecast|predict|future"));
static WANTS_ADVICE: LazyLock<Regex> = LazyLock::new(|| regex(r"recommend|suggest|advice"));

const GREETING: &str = "Hello! I'm your assistant for software license management. \
How can I help you today?";

const HELP: &str = "I can help you with several tasks:

  Dashboard & overview: current license status, costs and utilization
  Reports: summaries for AP, Procurement or Executive teams
  Analysis: usage patterns, trends and performance metrics
  Recommendations: renewal decisions and cost optimization
  Forecasting: future usage and costs
  Comparisons: licenses or vendors side by side

Try asking me things like:
  \"Show me the dashboard\"
  \"Generate a quarterly report for our AP team\"
  \"Which licenses should we cancel to save money?\"
  \"Compare Zoom and Slack usage\"
  \"What are the cost trends for the last 30 days?\"";

const UNKNOWN: &str = "I'm not sure I understand your request. I can help you with:

  Dashboard overviews and summaries
  Reports for different teams
  License analysis and trends
  Cost optimization recommendations
  Usage forecasting
  License comparisons

Could you try rephrasing your question or ask me to help you get started?";

/// Classifies messages with fixed patterns.
#[derive(Debug, Clone)]
pub struct RuleBasedAssistant {
    /// Lowercase names recognized as license mentions.
    license_names: Vec<String>,
    today: NaiveDate,
}

impl RuleBasedAssistant {
    /// `license_names` are matched case-insensitively as substrings;
    /// relative time periods resolve against `today`.
    pub fn new(license_names: impl IntoIterator<Item = String>, today: NaiveDate) -> Self {
        let mut names: Vec<String> =
            license_names.into_iter().map(|name| name.to_lowercase()).collect();
        names.sort();
        names.dedup();
        Self { license_names: names, today }
    }

    pub fn license_names(&self) -> &[String] {
        &self.license_names
    }

    /// Synchronous core of [`Assistant::parse_intent`].
    pub fn classify(&self, message: &str) -> Intent {
        let text = message.trim().to_lowercase();

        let (category, category_score) = classify_category(&text);
        let entities = self.extract_entities(&text);
        let parameters = extract_parameters(&text);

        let mut confidence = category_score;
        if !entities.is_empty() {
            confidence += 0.1;
        }
        if parameters.detail_level != DetailLevel::Standard {
            confidence += 0.05;
        }

        Intent {
            category,
            action: extract_action(&text),
            entities,
            parameters,
            confidence: confidence.min(1.0),
            original_message: message.to_string(),
        }
    }

    fn extract_entities(&self, text: &str) -> Entities {
        Entities {
            time_period: self.extract_time_period(text),
            licenses: self
                .license_names
                .iter()
                .filter(|name| text.contains(name.as_str()))
                .cloned()
                .collect(),
            metrics: METRICS
                .iter()
                .filter(|metric| text.contains(*metric))
                .map(|metric| (*metric).to_string())
                .collect(),
            teams: TEAM_PATTERNS
                .iter()
                .filter(|(_, patterns)| patterns.is_match(text))
                .map(|(team, _)| (*team).to_string())
                .collect(),
        }
    }

    fn extract_time_period(&self, text: &str) -> Option<TimePeriod> {
        if let Some(days) =
            LAST_DAYS.captures(text).and_then(|caps| caps[1].parse::<u32>().ok())
        {
            return Some(TimePeriod::last_days(days, self.today));
        }
        if LAST_WEEK.is_match(text) {
            return Some(TimePeriod::last_week(self.today));
        }
        if LAST_MONTH.is_match(text) {
            return Some(TimePeriod::last_month(self.today));
        }
        let quarter = QUARTER.captures(text).and_then(|caps| caps[1].parse::<u32>().ok())?;
        Some(TimePeriod::quarter(quarter, self.today))
    }
}

/// Best category by normalized pattern hits; `Unknown` with 0 when nothing matches.
fn classify_category(text: &str) -> (IntentCategory, f64) {
    let mut best = (IntentCategory::Unknown, 0.0);
    for (category, patterns) in CATEGORY_PATTERNS.iter() {
        let hits = patterns.matches(text).iter().count();
        if hits == 0 {
            continue;
        }
        let score = (hits as f64 * PATTERN_WEIGHT / patterns.len() as f64).min(1.0);
        if score > best.1 {
            best = (*category, score);
        }
    }
    best
}

fn extract_action(text: &str) -> IntentAction {
    ACTION_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.is_match(text))
        .map_or(IntentAction::Show, |(action, _)| *action)
}

fn extract_parameters(text: &str) -> Parameters {
    let detail_level = if DETAILED.is_match(text) {
        DetailLevel::Detailed
    } else if SUMMARY.is_match(text) {
        DetailLevel::Summary
    } else {
        DetailLevel::Standard
    };

    let format = if PDF.is_match(text) {
        ReportFormat::Pdf
    } else if EXCEL.is_match(text) {
        ReportFormat::Excel
    } else {
        ReportFormat::Json
    };

    Parameters {
        detail_level,
        format,
        include_visualizations: !NO_VISUALS.is_match(text),
        include_forecasts: WANTS_FORECAST.is_match(text),
        include_recommendations: WANTS_ADVICE.is_match(text),
    }
}

#[async_trait]
impl Assistant for RuleBasedAssistant {
    async fn parse_intent(
        &self,
        message: &str,
        _context: Option<&ConversationContext>,
    ) -> Result<Intent, AssistantError> {
        let intent = self.classify(message);
        debug!(
            category = %intent.category,
            confidence = intent.confidence,
            "Rule-based intent"
        );
        Ok(intent)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AssistantError> {
        match ReplyKind::from_prompt(prompt) {
            Some(ReplyKind::Greeting) => Ok(GREETING.to_string()),
            Some(ReplyKind::Help) => Ok(HELP.to_string()),
            Some(ReplyKind::Unknown) => Ok(UNKNOWN.to_string()),
            None => Err(AssistantError::Unavailable(
                "rule-based assistant only answers canned prompts".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn assistant() -> RuleBasedAssistant {
        RuleBasedAssistant::new(
            ["Slack".to_string(), "zoom".to_string(), "Zoom".to_string()],
            today(),
        )
    }

    #[test]
    fn test_names_are_normalized() {
        assert_eq!(assistant().license_names(), ["slack", "zoom"]);
    }

    #[test]
    fn test_category_scoring() {
        // "show.*dashboard" and "dashboard" hit out of seven patterns.
        let intent = assistant().classify("Show me the dashboard");
        assert_eq!(intent.category, IntentCategory::Dashboard);
        assert_eq!(intent.action, IntentAction::Show);
        assert!((intent.confidence - 0.2 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_message_is_unknown() {
        let intent = assistant().classify("xyz");
        assert_eq!(intent.category, IntentCategory::Unknown);
        assert_eq!(intent.action, IntentAction::Show);
        assert_eq!(intent.confidence, 0.0);
        assert_eq!(intent.original_message, "xyz");
    }

    #[test]
    fn test_time_periods() {
        let a = assistant();
        assert_eq!(
            a.classify("usage for the last 30 days").entities.time_period,
            Some(TimePeriod::last_days(30, today()))
        );
        assert_eq!(
            a.classify("costs last week").entities.time_period,
            Some(TimePeriod::last_week(today()))
        );
        assert_eq!(
            a.classify("spend last month").entities.time_period,
            Some(TimePeriod::last_month(today()))
        );
        assert_eq!(
            a.classify("q3 report").entities.time_period,
            Some(TimePeriod::Quarter { value: 3, year: 2024 })
        );
        assert_eq!(a.classify("report").entities.time_period, None);
    }

    #[test]
    fn test_huge_day_counts_do_not_overflow() {
        let a = assistant();
        let period = a.classify("show usage for the last 4000000000 days").entities.time_period;
        assert_eq!(
            period,
            Some(TimePeriod::Days {
                value: 4_000_000_000,
                start_date: NaiveDate::MIN,
                end_date: today(),
            })
        );
        assert_eq!(a.classify("usage for the last 99999999999 days").entities.time_period, None);
    }

    #[test]
    fn test_entities_and_confidence_boosts() {
        let intent = assistant().classify("Detailed cost comparison of Slack vs Zoom for finance");
        assert_eq!(intent.entities.licenses, vec!["slack", "zoom"]);
        assert_eq!(intent.entities.metrics, vec!["cost"]);
        assert_eq!(intent.entities.teams, vec!["finance"]);
        assert_eq!(intent.parameters.detail_level, DetailLevel::Detailed);
        assert_eq!(intent.category, IntentCategory::Comparison);

        let (_, base) = classify_category("detailed cost comparison of slack vs zoom for finance");
        assert!((intent.confidence - (base + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn test_parameters() {
        let params = extract_parameters("brief pdf forecast with no charts, suggest cuts");
        assert_eq!(params.detail_level, DetailLevel::Summary);
        assert_eq!(params.format, ReportFormat::Pdf);
        assert!(!params.include_visualizations);
        assert!(params.include_forecasts);
        assert!(params.include_recommendations);

        assert_eq!(extract_parameters("hello"), Parameters::default());
    }

    #[test]
    fn test_ap_team_is_recognized() {
        let intent = assistant().classify("Generate an AP team report");
        assert_eq!(intent.category, IntentCategory::Report);
        assert_eq!(intent.action, IntentAction::Generate);
        assert_eq!(intent.entities.teams, vec!["ap"]);
    }

    #[tokio::test]
    async fn test_generate_text_answers_canned_prompts_only() {
        let a = assistant();
        let help = a.generate_text(ReplyKind::Help.prompt()).await.unwrap();
        assert!(help.contains("Forecasting"));
        assert!(a.generate_text(ReplyKind::Greeting.prompt()).await.unwrap().starts_with("Hello"));

        let err = a.generate_text("Write a poem").await.unwrap_err();
        assert!(matches!(err, AssistantError::Unavailable(_)));
    }
}
