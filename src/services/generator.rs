//! Interfaces to the external content collaborators.
//!
//! The store never talks to these directly; [`super::CourseService`] wires
//! them together. Implementations are passed in as explicit handles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::content::VideoRecord;

/// Error types for collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Service is not reachable or not configured
    #[error("Generator unavailable: {0}")]
    Unavailable(String),

    /// Request reached the service but failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Response could not be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Text completion backend (an LLM endpoint).
///
/// Retrying transient failures is the implementation's concern.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, GenerationError>;
}

/// Snippet store used to enrich prompts. Never required for correctness.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Up to `limit` snippets relevant to `text`, best first.
    async fn query(&self, text: &str, limit: usize) -> Vec<String>;
}

/// Finds videos that fit a lesson.
#[async_trait]
pub trait VideoCurator: Send + Sync {
    async fn curate(&self, lesson_text: &str) -> Result<Vec<VideoRecord>, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_lowercase_role() {
        let json = serde_json::to_value(Message::system("hi")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hi");

        let parsed: Message =
            serde_json::from_str(r#"{"role": "assistant", "content": "ok"}"#).unwrap();
        assert_eq!(parsed, Message::assistant("ok"));
    }
}
