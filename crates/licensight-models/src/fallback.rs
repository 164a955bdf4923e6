//! Ordered chain of assistants.

use std::sync::Arc;

use async_trait::async_trait;
use licensight_abstraction::{Assistant, AssistantError, ConversationContext, Intent};
use tracing::{debug, warn};

/// Tries each assistant in turn; the first success wins.
#[derive(Clone, Default)]
pub struct FallbackAssistant {
    chain: Vec<Arc<dyn Assistant>>,
}

impl std::fmt::Debug for FallbackAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackAssistant").field("chain", &self.names()).finish()
    }
}

impl FallbackAssistant {
    pub fn new(chain: Vec<Arc<dyn Assistant>>) -> Self {
        Self { chain }
    }

    /// Appends `assistant` to the end of the chain.
    #[must_use]
    pub fn then(mut self, assistant: Arc<dyn Assistant>) -> Self {
        self.chain.push(assistant);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.chain.iter().map(|assistant| assistant.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

fn exhausted(last: Option<AssistantError>) -> AssistantError {
    AssistantError::AllProvidersFailed(
        last.map_or_else(|| "no assistants configured".to_string(), |err| err.to_string()),
    )
}

#[async_trait]
impl Assistant for FallbackAssistant {
    async fn parse_intent(
        &self,
        message: &str,
        context: Option<&ConversationContext>,
    ) -> Result<Intent, AssistantError> {
        let mut last = None;
        for assistant in &self.chain {
            match assistant.parse_intent(message, context).await {
                Ok(intent) => {
                    debug!(assistant = assistant.name(), "Intent parsed");
                    return Ok(intent);
                }
                Err(err) => {
                    warn!(assistant = assistant.name(), error = %err, "Intent parsing failed");
                    last = Some(err);
                }
            }
        }
        Err(exhausted(last))
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, AssistantError> {
        let mut last = None;
        for assistant in &self.chain {
            match assistant.generate_text(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    warn!(assistant = assistant.name(), error = %err, "Text generation failed");
                    last = Some(err);
                }
            }
        }
        Err(exhausted(last))
    }

    fn name(&self) -> &str {
        "fallback"
    }
}
