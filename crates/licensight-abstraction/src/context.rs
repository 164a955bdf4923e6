//! Conversation state carried between messages of one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::{Intent, IntentCategory, TimePeriod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { role, content: content.into(), timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: String,
    pub session_id: String,
    pub current_topic: Option<IntentCategory>,
    #[serde(default)]
    pub previous_intents: Vec<IntentCategory>,
    pub preferred_team: Option<String>,
    pub preferred_time_period: Option<TimePeriod>,
    /// Team of the last report asked for, `general` when none was named.
    pub last_report_type: Option<String>,
    /// First metric of the last analysis, `general` when none was named.
    pub last_analysis_focus: Option<String>,
    /// Messages in the order they were exchanged.
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
            current_topic: None,
            previous_intents: Vec::new(),
            preferred_team: None,
            preferred_time_period: None,
            last_report_type: None,
            last_analysis_focus: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds a newly parsed intent into the topic and preferences.
    pub fn record_intent(&mut self, intent: &Intent, now: DateTime<Utc>) {
        self.previous_intents.push(intent.category);
        self.current_topic = Some(intent.category);

        let entities = &intent.entities;
        if let Some(team) = entities.teams.first() {
            self.preferred_team = Some(team.clone());
        }
        if entities.time_period.is_some() {
            self.preferred_time_period = entities.time_period;
        }

        match intent.category {
            IntentCategory::Report => {
                let team = entities.teams.first().map_or("general", String::as_str);
                self.last_report_type = Some(team.to_string());
            }
            IntentCategory::Analysis => {
                let focus = entities.metrics.first().map_or("general", String::as_str);
                self.last_analysis_focus = Some(focus.to_string());
            }
            _ => {}
        }

        self.updated_at = now;
    }

    /// Appends a user message and the reply to it.
    pub fn record_exchange(&mut self, message: &str, reply: &str, now: DateTime<Utc>) {
        self.history.push(ChatMessage::new(Role::User, message, now));
        self.history.push(ChatMessage::new(Role::Assistant, reply, now));
        self.updated_at = now;
    }

    /// The last `limit` messages.
    pub fn recent_history(&self, limit: usize) -> &[ChatMessage] {
        &self.history[self.history.len().saturating_sub(limit)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Entities, IntentAction, Parameters};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_717_200_000, 0).unwrap()
    }

    fn intent(category: IntentCategory, entities: Entities) -> Intent {
        Intent {
            category,
            action: IntentAction::Show,
            entities,
            parameters: Parameters::default(),
            confidence: 0.4,
            original_message: String::new(),
        }
    }

    #[test]
    fn test_report_without_team_is_general() {
        let mut context = ConversationContext::new("user", "s1", now());
        context.record_intent(&intent(IntentCategory::Report, Entities::default()), now());

        assert_eq!(context.last_report_type.as_deref(), Some("general"));
        assert_eq!(context.current_topic, Some(IntentCategory::Report));
        assert_eq!(context.preferred_team, None);
    }

    #[test]
    fn test_entities_update_preferences() {
        let mut context = ConversationContext::new("user", "s1", now());
        let entities = Entities {
            teams: vec!["procurement".to_string()],
            metrics: vec!["cost".to_string()],
            ..Entities::default()
        };
        context.record_intent(&intent(IntentCategory::Analysis, entities), now());

        assert_eq!(context.preferred_team.as_deref(), Some("procurement"));
        assert_eq!(context.last_analysis_focus.as_deref(), Some("cost"));
        assert_eq!(context.previous_intents, vec![IntentCategory::Analysis]);
    }

    #[test]
    fn test_recent_history() {
        let mut context = ConversationContext::new("user", "s1", now());
        assert!(context.recent_history(5).is_empty());

        for i in 0..4 {
            context.record_exchange(&format!("q{i}"), &format!("a{i}"), now());
        }
        let recent = context.recent_history(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].content, "a2");
        assert_eq!(recent[2].role, Role::Assistant);
    }
}
