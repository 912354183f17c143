use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

static MESSAGE_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the transcript kept by the application layer.
///
/// Messages are never mutated after creation, so fields are only exposed
/// through accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: u64,
    role: Role,
    content: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MESSAGE_COUNTER.fetch_add(1, Ordering::Relaxed),
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqCategory {
    General,
    Symptoms,
    Prevention,
    Emergency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FaqItem {
    pub question: &'static str,
    pub category: FaqCategory,
}

/// Sustainable Development Goal the project reports against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SdgGoal {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_increase() {
        let first = ChatMessage::user("hello");
        let second = ChatMessage::assistant("namaste");
        assert!(second.id() > first.id());
        assert_eq!(first.role(), Role::User);
        assert_eq!(second.role(), Role::Assistant);
    }

    #[test]
    fn message_serializes_lowercase_role_and_rfc3339_timestamp() {
        let msg = ChatMessage::user("fever");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "fever");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));

        let back: ChatMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }
}
