//! Anthropic translator implementation
//!
//! Translates between the canonical model and Anthropic's messages API format.
//! Handles Anthropic's strict message alternation requirements and system prompt extraction.

use serde::{Deserialize, Serialize};

use super::{merge_extra, MessageTranslator, TranslationError};
use crate::native::conversation::Conversation;
use crate::native::params::ModelParams;
use crate::native::response::Completion;
use crate::native::types::{ContentItem, FinishReason, ImageSource, Message, Role};

/// Anthropic API translator
///
/// Anthropic has stricter requirements than OpenAI:
/// - The system prompt goes to a separate `system` field, not in the messages array
/// - Messages must strictly alternate between user and assistant
/// - First non-system message must be from user
#[derive(Debug, Clone, Default)]
pub struct AnthropicTranslator;

impl AnthropicTranslator {
    /// Create a new Anthropic translator
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock<'a> {
    Text { text: &'a str },
    Image { source: &'a ImageSource },
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum AnthropicMessage<'a> {
    User { content: Vec<AnthropicBlock<'a>> },
    Assistant { content: Vec<AnthropicBlock<'a>> },
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

/// Validate that messages follow Anthropic's strict alternation rules
///
/// Anthropic requires:
/// 1. At least one user message (after filtering out the system message)
/// 2. First non-system message must be from user role
/// 3. Messages must strictly alternate between user and assistant
pub fn validate_anthropic_alternation(messages: &[&Message]) -> Result<(), TranslationError> {
    if messages.is_empty() {
        return Err(TranslationError::NoUserMessage);
    }

    if messages[0].role() != Role::User {
        return Err(TranslationError::FirstMustBeUser);
    }

    let mut expect_user = true;
    for message in messages {
        let is_user = message.role() == Role::User;
        if expect_user != is_user {
            return Err(TranslationError::MustAlternate);
        }
        expect_user = !expect_user;
    }

    Ok(())
}

/// Split the leading system prompt from the rest of the conversation
///
/// Fails with `MissingSystemMessage` when the conversation does not open with one,
/// because Anthropic takes the prompt as a top-level field.
pub fn extract_system_prompt(
    conversation: &Conversation,
) -> Result<(&str, Vec<&Message>), TranslationError> {
    let system = conversation
        .system_prompt()
        .ok_or(TranslationError::MissingSystemMessage)?;

    let rest = conversation
        .messages()
        .iter()
        .filter(|m| m.role() != Role::System)
        .collect();

    Ok((system, rest))
}

fn to_block(item: &ContentItem) -> AnthropicBlock<'_> {
    match item {
        ContentItem::Text { text } => AnthropicBlock::Text { text },
        ContentItem::Image { source } => AnthropicBlock::Image { source },
    }
}

fn to_wire_message(message: &Message) -> Result<AnthropicMessage<'_>, TranslationError> {
    match message {
        Message::User { content } => Ok(AnthropicMessage::User {
            content: content.iter().map(to_block).collect(),
        }),
        Message::Assistant { content, .. } => Ok(AnthropicMessage::Assistant {
            content: content.iter().map(to_block).collect(),
        }),
        Message::System { .. } => Err(TranslationError::InvalidMessageFormat(
            "system message inside the message list".to_string(),
        )),
    }
}

impl MessageTranslator for AnthropicTranslator {
    fn translate_request(
        &self,
        model: &str,
        conversation: &Conversation,
        params: &ModelParams,
    ) -> Result<serde_json::Value, TranslationError> {
        let (system, messages) = extract_system_prompt(conversation)?;
        validate_anthropic_alternation(&messages)?;

        let request = AnthropicRequest {
            model,
            system,
            messages: messages
                .into_iter()
                .map(to_wire_message)
                .collect::<Result<Vec<_>, _>>()?,
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop_sequences: params.stop.as_ref().map(|s| s.to_vec()),
        };

        let mut body = serde_json::to_value(&request)?;
        merge_extra(&mut body, params)?;
        Ok(body)
    }

    fn translate_response(
        &self,
        response: serde_json::Value,
    ) -> Result<Completion, TranslationError> {
        let response: AnthropicResponse = serde_json::from_value(response)?;

        let text = response
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicResponseBlock::Text { text } => Some(text.as_str()),
                AnthropicResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let finish_reason = self.translate_stop_reason(response.stop_reason.as_deref());
        Ok(Completion::new(text, finish_reason))
    }

    fn translate_stop_reason(&self, reason: Option<&str>) -> FinishReason {
        // Anthropic uses: end_turn, max_tokens, stop_sequence, tool_use, refusal
        match reason {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Complete,
            Some("max_tokens") => FinishReason::Truncated,
            Some("refusal") => FinishReason::ContentFiltered,
            Some("tool_use") => FinishReason::ToolCallRequested,
            None | Some("null") => FinishReason::Empty,
            Some(_) => FinishReason::Unknown,
        }
    }
}
