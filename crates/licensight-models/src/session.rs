//! Conversation sessions shared between requests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use licensight_abstraction::{ConversationContext, Intent};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

pub type SessionResult<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed session file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Contexts keyed by `<user_id>_<session_id>`.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ConversationContext>>,
}

fn key(user_id: &str, session_id: &str) -> String {
    format!("{user_id}_{session_id}")
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads sessions saved by [`SessionStore::save`]; a missing file yields an empty store.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => return Err(SessionError::Io { path: path.to_path_buf(), source }),
        };
        let contexts: Vec<ConversationContext> = serde_json::from_str(&contents)
            .map_err(|source| SessionError::Json { path: path.to_path_buf(), source })?;

        let sessions = contexts
            .into_iter()
            .map(|context| (key(&context.user_id, &context.session_id), context))
            .collect();
        Ok(Self { sessions: RwLock::new(sessions) })
    }

    pub async fn save(&self, path: &Path) -> SessionResult<()> {
        let mut contexts: Vec<ConversationContext> =
            self.sessions.read().await.values().cloned().collect();
        contexts.sort_by(|a, b| (&a.user_id, &a.session_id).cmp(&(&b.user_id, &b.session_id)));

        let json = serde_json::to_string_pretty(&contexts)
            .map_err(|source| SessionError::Json { path: path.to_path_buf(), source })?;
        fs::write(path, json)
            .map_err(|source| SessionError::Io { path: path.to_path_buf(), source })
    }

    /// Snapshot of the session, created empty if it does not exist yet.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> ConversationContext {
        self.sessions
            .write()
            .await
            .entry(key(user_id, session_id))
            .or_insert_with(|| {
                debug!(user_id, session_id, "Starting conversation");
                ConversationContext::new(user_id, session_id, now)
            })
            .clone()
    }

    pub async fn get(&self, user_id: &str, session_id: &str) -> Option<ConversationContext> {
        self.sessions.read().await.get(&key(user_id, session_id)).cloned()
    }

    /// Records an answered message and the intent it was classified as.
    pub async fn record(
        &self,
        user_id: &str,
        session_id: &str,
        intent: &Intent,
        reply: &str,
        now: DateTime<Utc>,
    ) {
        let mut sessions = self.sessions.write().await;
        let context = sessions
            .entry(key(user_id, session_id))
            .or_insert_with(|| ConversationContext::new(user_id, session_id, now));
        context.record_intent(intent, now);
        context.record_exchange(&intent.original_message, reply, now);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
