//! Assistant abstraction layer for Licensight.
//!
//! This module defines the trait and types shared by every natural-language
//! assistant: intent classification of user messages and free-text replies.

mod context;
mod intent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::{ChatMessage, ConversationContext, Role};
pub use intent::{
    AnalysisRequest, DetailLevel, Entities, Intent, IntentAction, IntentCategory, Parameters,
    ReportFormat, TimePeriod,
};

/// Represents an error that can occur when talking to an assistant.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistantError {
    /// The request could not be sent (network issues, invalid request).
    #[error("Request Error: {0}")]
    RequestError(String),

    /// The provider answered with an error or an unusable reply.
    #[error("Response Error: {0}")]
    ResponseError(String),

    /// A reply could not be decoded.
    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// The assistant is not configured or cannot handle this request.
    #[error("Assistant Unavailable: {0}")]
    Unavailable(String),

    /// Every assistant in a fallback chain failed; holds the last error.
    #[error("All assistants failed: {0}")]
    AllProvidersFailed(String),
}

impl From<serde_json::Error> for AssistantError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Canned replies every assistant should be able to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Help,
    Unknown,
}

impl ReplyKind {
    const ALL: [Self; 3] = [Self::Greeting, Self::Help, Self::Unknown];

    /// Prompt asking an assistant for this reply.
    pub const fn prompt(self) -> &'static str {
        match self {
            Self::Greeting => {
                "Generate a personalized greeting for a software license management assistant"
            }
            Self::Help => {
                "Generate a comprehensive help message for a software license management \
                 assistant"
            }
            Self::Unknown => {
                "Generate a helpful response for when you don't understand a user's request \
                 about software license management"
            }
        }
    }

    /// Recognizes one of the prompts produced by [`ReplyKind::prompt`].
    pub fn from_prompt(prompt: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prompt() == prompt)
    }
}

/// A trait for natural-language assistants.
///
/// All assistants must be `Send + Sync` to allow sharing across tasks.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Classifies `message`, optionally in light of an ongoing conversation.
    ///
    /// # Errors
    /// Returns an `AssistantError` if the message could not be classified.
    async fn parse_intent(
        &self,
        message: &str,
        context: Option<&ConversationContext>,
    ) -> Result<Intent, AssistantError>;

    /// Generates a free-text reply to `prompt`.
    ///
    /// # Errors
    /// Returns an `AssistantError` if no reply could be produced.
    async fn generate_text(&self, prompt: &str) -> Result<String, AssistantError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
