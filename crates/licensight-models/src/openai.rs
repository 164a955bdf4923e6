//! OpenAI-compatible assistant.
//!
//! Sends chat-completion requests to `{base_url}/chat/completions`; intent
//! recognition asks the model for a JSON object and decodes it into an
//! [`Intent`].

use std::time::Duration;

use async_trait::async_trait;
use licensight_abstraction::{
    Assistant, AssistantError, ConversationContext, Entities, Intent, IntentCategory, Parameters,
    Role, TimePeriod,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Conversation messages forwarded with an intent request.
const HISTORY_LIMIT: usize = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_CONFIDENCE: f64 = 0.8;

const BASE_PROMPT: &str = "You are an assistant specialized in software license management \
and cost optimization. You help users analyze their software licenses, generate reports, \
provide recommendations, and answer questions about license utilization and costs. Always \
provide accurate and actionable insights.";

const INTENT_PROMPT: &str = r#"You classify user messages about software license management.

Reply with a single JSON object and nothing else:
{
  "intent_category": "dashboard | report | analysis | recommendation | forecast |
                      comparison | optimization | greeting | help | unknown",
  "action": "show | generate | compare | analyze | recommend | forecast | optimize |
             explain | greet | help",
  "entities": {
    "teams": ["ap", "procurement", "finance", "executive"],
    "licenses": ["mentioned license names"],
    "metrics": ["cost", "usage", "utilization", ...]
  },
  "parameters": {
    "detail_level": "summary | standard | detailed",
    "format": "json | pdf | excel"
  },
  "confidence": 0.0
}"#;

/// Assistant backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIAssistant {
    /// The model ID (e.g., "gpt-4-turbo-preview").
    model: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAIAssistant {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, DEFAULT_BASE_URL)
    }

    /// Targets another OpenAI-compatible server, e.g. "http://localhost:8000/v1".
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_default();
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: Vec<OpenAIMessage>) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, message_count = messages.len(), "Sending chat completion");

        let request_body = OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 2000,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to OpenAI API");
                AssistantError::RequestError(format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "OpenAI API returned error status");
            return Err(AssistantError::ResponseError(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse OpenAI API response");
            AssistantError::SerializationError(format!("Failed to parse response: {}", e))
        })?;

        openai_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AssistantError::ResponseError("No content in API response".to_string()))
    }
}

fn message(role: Role, content: &str) -> OpenAIMessage {
    OpenAIMessage { role: role.as_str().to_string(), content: content.to_string() }
}

/// Strips a Markdown code fence some models wrap JSON replies in.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decodes a model reply into an intent.
///
/// Unrecognized categories become `unknown`; unrecognized actions,
/// parameters and time periods fall back to their defaults.
fn decode_intent(reply: &str, original_message: &str) -> Result<Intent, AssistantError> {
    let payload: IntentPayload = serde_json::from_str(strip_code_fence(reply))?;

    let action = payload
        .action
        .and_then(|action| serde_json::from_value(serde_json::Value::String(action)).ok())
        .unwrap_or_default();
    let time_period: Option<TimePeriod> = serde_json::from_value(payload.entities.time_period)
        .ok()
        .flatten();

    Ok(Intent {
        category: payload.intent_category.unwrap_or(IntentCategory::Unknown),
        action,
        entities: Entities {
            time_period,
            licenses: payload.entities.licenses,
            metrics: payload.entities.metrics,
            teams: payload.entities.teams,
        },
        parameters: serde_json::from_value::<Parameters>(payload.parameters).unwrap_or_default(),
        confidence: payload.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0),
        original_message: original_message.to_string(),
    })
}

#[async_trait]
impl Assistant for OpenAIAssistant {
    async fn parse_intent(
        &self,
        message_text: &str,
        context: Option<&ConversationContext>,
    ) -> Result<Intent, AssistantError> {
        let mut messages = vec![message(Role::System, INTENT_PROMPT)];
        if let Some(context) = context {
            messages.extend(
                context
                    .recent_history(HISTORY_LIMIT)
                    .iter()
                    .map(|turn| message(turn.role, &turn.content)),
            );
        }
        messages.push(message(Role::User, message_text));

        let reply = self.chat(messages).await?;
        let intent = decode_intent(&reply, message_text)?;
        debug!(category = %intent.category, confidence = intent.confidence, "OpenAI intent");
        Ok(intent)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AssistantError> {
        self.chat(vec![message(Role::System, BASE_PROMPT), message(Role::User, prompt)]).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// OpenAI API request/response structures

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct IntentPayload {
    #[serde(default)]
    intent_category: Option<IntentCategory>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    entities: EntitiesPayload,
    #[serde(default)]
    parameters: serde_json::Value,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct EntitiesPayload {
    #[serde(default)]
    teams: Vec<String>,
    #[serde(default)]
    licenses: Vec<String>,
    #[serde(default)]
    metrics: Vec<String>,
    #[serde(default)]
    time_period: serde_json::Value,
}
