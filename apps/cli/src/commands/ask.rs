//! Natural-language question command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use licensight_abstraction::{Assistant, Intent, IntentCategory, ReplyKind};
use licensight_core::{LicenseRecord, Portfolio};
use licensight_models::{AssistantFactory, SessionStore};
use serde::Serialize;
use tracing::debug;

use super::{CommandContext, print_json};
use crate::answers::Responder;

/// Conversation history file inside the data directory.
pub const SESSIONS_FILE: &str = "sessions.json";

#[derive(Serialize)]
struct AskOutput<'a> {
    assistant: Vec<&'a str>,
    intent: &'a Intent,
    reply: &'a str,
    suggestions: &'static [&'static str],
}

/// Execute ask command.
pub async fn execute(ctx: &CommandContext, message: &str, user: &str, session: &str) -> Result<()> {
    let portfolio = Portfolio::load(&ctx.store).context("Failed to load portfolio")?;
    let assistant = AssistantFactory::from_config(
        &ctx.config.assistant,
        vocabulary(portfolio.licenses()),
        ctx.today,
    )
    .context("Failed to configure the assistant")?;

    let sessions_path = ctx.store.data_dir().join(SESSIONS_FILE);
    let sessions =
        SessionStore::load(&sessions_path).context("Failed to load conversation history")?;
    let now = Utc::now();
    let conversation = sessions.get_or_create(user, session, now).await;

    let intent = assistant
        .parse_intent(message, Some(&conversation))
        .await
        .context("Failed to interpret the message")?;
    debug!(category = %intent.category, confidence = intent.confidence, "Parsed intent");

    let engine = ctx.engine();
    let responder = Responder::new(&portfolio, &engine, ctx.config.horizon_days(), now);
    let reply = match responder.answer(&intent) {
        Some(reply) => reply,
        None => assistant
            .generate_text(reply_kind(intent.category).prompt())
            .await
            .context("Failed to generate a reply")?,
    };

    sessions.record(user, session, &intent, &reply, now).await;
    sessions.save(&sessions_path).await.context("Failed to save conversation history")?;

    let suggestions = intent.category.suggestions();
    if ctx.json {
        return print_json(&AskOutput {
            assistant: assistant.names(),
            intent: &intent,
            reply: &reply,
            suggestions,
        });
    }

    println!("{}", reply);
    println!();
    println!("{}", "You could also ask:".dimmed());
    for suggestion in suggestions {
        println!("  • {}", suggestion);
    }
    Ok(())
}

const fn reply_kind(category: IntentCategory) -> ReplyKind {
    match category {
        IntentCategory::Greeting => ReplyKind::Greeting,
        IntentCategory::Help => ReplyKind::Help,
        _ => ReplyKind::Unknown,
    }
}

/// Words that identify a license in a message: its name, its vendor and the
/// first word of its name.
fn vocabulary(licenses: &[LicenseRecord]) -> Vec<String> {
    licenses
        .iter()
        .flat_map(|license| {
            let short = license.name.split_whitespace().next().map(str::to_string);
            [Some(license.name.clone()), Some(license.vendor.clone()), short]
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use licensight_core::LicenseStore;
    use tempfile::TempDir;

    #[test]
    fn test_vocabulary_includes_short_names() {
        let dir = TempDir::new().unwrap();
        let store = LicenseStore::open(dir.path()).unwrap();
        store.seed_sample_data(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(), 42).unwrap();

        let words = vocabulary(&store.licenses().unwrap());
        assert!(words.contains(&"AWS".to_string()));
        assert!(words.contains(&"Amazon Web Services".to_string()));
        assert!(words.contains(&"Slack Business+".to_string()));
        assert_eq!(words.len(), 18);
    }

    #[test]
    fn test_reply_kind() {
        assert_eq!(reply_kind(IntentCategory::Greeting), ReplyKind::Greeting);
        assert_eq!(reply_kind(IntentCategory::Help), ReplyKind::Help);
        assert_eq!(reply_kind(IntentCategory::Unknown), ReplyKind::Unknown);
        assert_eq!(reply_kind(IntentCategory::Dashboard), ReplyKind::Unknown);
    }
}
