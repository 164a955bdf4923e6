//! Assistant implementations for Licensight.
//!
//! This crate provides concrete implementations of the `Assistant` trait.
//!
//! # Supported Providers
//!
//! - **Rule-based**: regex intent patterns, always available, deterministic
//! - **OpenAI**: OpenAI or any OpenAI-compatible server (API key required)
//!
//! [`AssistantFactory`] composes them into a [`FallbackAssistant`] chain that
//! ends with the rule-based assistant.

pub mod factory;
pub mod fallback;
pub mod openai;
pub mod rule_based;
pub mod session;

pub use factory::{AssistantFactory, AssistantKind};
pub use fallback::FallbackAssistant;
pub use openai::OpenAIAssistant;
pub use rule_based::RuleBasedAssistant;
pub use session::{SessionError, SessionResult, SessionStore};
