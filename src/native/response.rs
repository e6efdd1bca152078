//! Completion result returned by adapters

use serde::{Deserialize, Serialize};

use super::types::{FinishReason, Message};

/// Text produced by one round trip plus the reason generation stopped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: FinishReason,
}

impl Completion {
    pub fn new(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            finish_reason,
        }
    }

    /// Assistant message recording this completion
    pub fn to_message(&self) -> Message {
        Message::assistant_text(self.text.clone(), self.finish_reason)
    }
}
