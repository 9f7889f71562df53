//! Chat session domain types.
//!
//! A session is an ordered, append-only message log scoped to a name.
//! Multiple sessions exist concurrently; the serving layer owns them and
//! the pipeline never touches them. Sessions live in memory only and are
//! discarded on process exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canned questions surfaced by the chat UIs.
pub const PRESET_QUERIES: [&str; 4] = [
    "Give me my 30-day health report",
    "Help me prepare for my Care Provider visit",
    "Give me my heart health status",
    "Explain my alerts",
];

/// The role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The answering model
    Assistant,
}

/// A single message in a session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: String,

    /// Who authored this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A named, append-only message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    /// Display name ("Session 1", "Session 2", ...)
    pub name: String,

    /// Ordered messages
    pub messages: Vec<ChatMessage>,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last message was appended
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a new empty session.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message. This is the only mutation a session supports.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Append a completed user/assistant exchange in one step, so a
    /// cancelled query never leaves a half-appended pair behind.
    pub fn push_exchange(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.push(ChatMessage::user(query));
        self.push(ChatMessage::assistant(answer));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn session_tracks_updates() {
        let mut session = ChatSession::new("Session 1");
        let created = session.created_at;

        session.push(ChatMessage::user("What are my alerts?"));
        assert_eq!(session.len(), 1);
        assert!(session.updated_at >= created);
    }

    #[test]
    fn push_exchange_appends_ordered_pair() {
        let mut session = ChatSession::new("Session 1");
        session.push_exchange("question", "answer");

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages[0].role, Role::User);
        assert_eq!(session.messages[0].content, "question");
        assert_eq!(session.messages[1].role, Role::Assistant);
        assert_eq!(session.messages[1].content, "answer");
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ChatMessage::assistant("Your heart health looks stable.");
        let json = serde_json::to_string(&msg).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content, msg.content);
        assert_eq!(back.role, Role::Assistant);
    }
}
