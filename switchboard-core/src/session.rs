//! Conversation state storage for callers
//!
//! Agents built on the gateway keep per-conversation history and working
//! data between turns. That state belongs to the caller: it is loaded before
//! a [`CallRequest`](crate::protocol::CallRequest) is built and saved after
//! the result comes back. The gateway itself never reads or writes it.

use crate::protocol::types::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// State kept for one conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub history: Vec<Message>,

    /// Free-form working data (collected artefacts, flags, ...)
    #[serde(default)]
    pub data: Value,
}

impl SessionState {
    /// Record a completed user/assistant exchange
    pub fn record_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.history.push(Message::user(user));
        self.history.push(Message::assistant(assistant));
    }

    /// Drop the oldest messages beyond `max_messages`
    pub fn truncate_history(&mut self, max_messages: usize) {
        if self.history.len() > max_messages {
            let excess = self.history.len() - max_messages;
            self.history.drain(..excess);
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionError>;

    async fn save(&self, session_id: &str, state: SessionState) -> Result<(), SessionError>;

    /// Returns whether a session was removed
    async fn remove(&self, session_id: &str) -> Result<bool, SessionError>;

    /// Append messages to a session, creating it if needed
    async fn append(
        &self,
        session_id: &str,
        messages: Vec<Message>,
    ) -> Result<SessionState, SessionError> {
        let mut state = self.load(session_id).await?.unwrap_or_default();
        state.history.extend(messages);
        self.save(session_id, state.clone()).await?;
        Ok(state)
    }
}

/// Process-local store; state is lost on restart
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    max_history: Option<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_messages` history entries per session
    pub fn with_max_history(max_messages: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history: Some(max_messages),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionState>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, mut state: SessionState) -> Result<(), SessionError> {
        if let Some(max) = self.max_history {
            state.truncate_history(max);
        }
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), state);
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<bool, SessionError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(session_id).is_some())
    }
}
