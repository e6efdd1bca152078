//! Turn compaction
//!
//! Collapses the synthetic continuation exchanges left behind by an
//! until-completion run into a single assistant turn.

use tracing::debug;

use crate::error::{ColloquyError, Result};
use crate::native::{ContentItem, Conversation, FinishReason, Message};

/// Replace everything after the last real user turn with one assistant message
///
/// A real user turn is a user message whose content differs from
/// `continuation_prompt`. Without one the conversation is left untouched and
/// `Compaction` is returned.
pub fn compact(
    conversation: &mut Conversation,
    full_text: &str,
    continuation_prompt: &[ContentItem],
) -> Result<()> {
    let anchor = conversation
        .messages()
        .iter()
        .rposition(|message| match message {
            Message::User { content } => content.as_slice() != continuation_prompt,
            _ => false,
        })
        .ok_or_else(|| {
            ColloquyError::Compaction(
                "no user message other than the continuation prompt".to_string(),
            )
        })?;

    let dropped = conversation.len() - (anchor + 1);
    conversation.truncate(anchor + 1);
    conversation.push(Message::assistant_text(full_text, FinishReason::Complete))?;

    debug!(anchor, dropped, "Compacted continuation turns");
    Ok(())
}
