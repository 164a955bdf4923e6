//! Builds the assistant chain from configuration.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use licensight_abstraction::AssistantError;
use licensight_core::AssistantConfig;
use tracing::{debug, error, warn};

use crate::{FallbackAssistant, OpenAIAssistant, RuleBasedAssistant};

/// Assistant provider enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantKind {
    RuleBased,
    /// OpenAI or any OpenAI-compatible server.
    OpenAI,
}

impl FromStr for AssistantKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule-based" | "rule_based" | "rules" => Ok(Self::RuleBased),
            "openai" | "openai-compatible" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

/// Factory for assistant chains.
pub struct AssistantFactory;

impl AssistantFactory {
    /// Remote assistant first when configured and its API key is set; the
    /// rule-based assistant always last.
    ///
    /// # Errors
    /// Returns `AssistantError::Unavailable` for an unrecognized provider.
    pub fn from_config(
        config: &AssistantConfig,
        license_names: Vec<String>,
        today: NaiveDate,
    ) -> Result<FallbackAssistant, AssistantError> {
        let provider = config.provider();
        let kind = AssistantKind::from_str(provider).map_err(|()| {
            error!(provider, "Unrecognized assistant provider");
            AssistantError::Unavailable(format!("Unrecognized assistant provider: {}", provider))
        })?;
        debug!(?kind, model = config.model(), "Building assistant chain");

        let mut chain = FallbackAssistant::default();
        if kind == AssistantKind::OpenAI {
            match config.api_key() {
                Some(api_key) => {
                    chain = chain.then(Arc::new(OpenAIAssistant::with_base_url(
                        config.model(),
                        api_key,
                        config.base_url(),
                    )));
                }
                None => warn!(
                    env = config.api_key_env(),
                    "API key not set; using the rule-based assistant only"
                ),
            }
        }

        Ok(chain.then(Arc::new(RuleBasedAssistant::new(license_names, today))))
    }
}
