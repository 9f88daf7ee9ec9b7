use chrono::{DateTime, Utc};
use serde::Serialize;

/// Prefix put in front of every failure recorded in the conversation.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    text: String,
    at: DateTime<Utc>,
    is_error: bool,
}

impl Message {
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    /// True for answer entries that record a failed round trip.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Append-only record of the chat.
///
/// Failures are recorded as answers, never rolled back, so the question that
/// caused them stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_question(&mut self, text: impl Into<String>, at: DateTime<Utc>) {
        self.push(Role::Question, text.into(), at, false);
    }

    pub fn push_answer(&mut self, text: impl Into<String>, at: DateTime<Utc>) {
        self.push(Role::Answer, text.into(), at, false);
    }

    /// Record a failure as an answer entry prefixed with `ERROR_PREFIX`.
    pub fn push_error(&mut self, message: &str, at: DateTime<Utc>) {
        self.push(Role::Answer, format!("{ERROR_PREFIX}{message}"), at, true);
    }

    fn push(&mut self, role: Role, text: String, at: DateTime<Utc>, is_error: bool) {
        self.messages.push(Message {
            role,
            text,
            at,
            is_error,
        });
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
