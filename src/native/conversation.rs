//! Conversation log
//!
//! An ordered sequence of messages with two invariants enforced on every
//! mutation: at most one system message, and only in first position; user and
//! assistant messages carry at least one content item.

use serde::{Deserialize, Serialize};

use super::types::{ContentItem, Message, Role};
use crate::error::{ColloquyError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ConversationRepr", into = "ConversationRepr")]
pub struct Conversation {
    messages: Vec<Message>,
}

/// Serialized form: `{"messages": [...]}`
#[derive(Serialize, Deserialize)]
struct ConversationRepr {
    messages: Vec<Message>,
}

impl TryFrom<ConversationRepr> for Conversation {
    type Error = ColloquyError;

    fn try_from(repr: ConversationRepr) -> Result<Self> {
        Conversation::from_messages(repr.messages)
    }
}

impl From<Conversation> for ConversationRepr {
    fn from(conversation: Conversation) -> Self {
        ConversationRepr {
            messages: conversation.messages,
        }
    }
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation that starts with a system prompt
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    /// Build a conversation from existing messages, validating every one
    pub fn from_messages(messages: Vec<Message>) -> Result<Self> {
        let mut conversation = Self::new();
        for message in messages {
            conversation.push(message)?;
        }
        Ok(conversation)
    }

    /// Append a message, rejecting anything that would break the invariants
    pub fn push(&mut self, message: Message) -> Result<()> {
        if message.role() == Role::System && !self.messages.is_empty() {
            return Err(ColloquyError::InvalidConversation(
                "a system message is only allowed as the first message".to_string(),
            ));
        }
        if let Some(content) = message.content_items() {
            if content.is_empty() {
                return Err(ColloquyError::InvalidConversation(format!(
                    "{} message must have at least one content item",
                    message.role()
                )));
            }
        }
        self.messages.push(message);
        Ok(())
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: Vec<ContentItem>) -> Result<()> {
        self.push(Message::user(content))
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The leading system prompt, if any
    pub fn system_prompt(&self) -> Option<&str> {
        match self.messages.first() {
            Some(Message::System { content }) => Some(content.as_str()),
            _ => None,
        }
    }

    /// Text of the most recent assistant message
    pub fn latest_assistant_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
            .map(Message::text)
    }

    /// Texts of all assistant messages, oldest first
    pub fn assistant_texts(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role() == Role::Assistant)
            .map(Message::text)
            .collect()
    }

    /// Drop every message after the first `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }
}
