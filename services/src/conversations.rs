//! In-memory chat history per session.
//!
//! Only user turns are kept: every chat turn is answered from the user's own
//! messages plus freshly retrieved tips, never from earlier model replies.

use std::collections::HashMap;

use coach_stream::{ChatMessage, Role};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the user-role messages of `incoming` to `session` and returns
    /// the updated history. Unknown sessions start empty.
    pub async fn append_user_messages(
        &self,
        session: &str,
        incoming: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session.to_string()).or_default();
        let before = history.len();
        history.extend(incoming.iter().filter(|m| m.role == Role::User).cloned());
        debug!(
            session,
            added = history.len() - before,
            total = history.len(),
            "conversation updated"
        );
        history.clone()
    }

    /// Snapshot of a session's history; empty for unknown sessions.
    pub async fn history(&self, session: &str) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Forgets a session. Returns whether it existed.
    pub async fn clear(&self, session: &str) -> bool {
        self.sessions.write().await.remove(session).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
