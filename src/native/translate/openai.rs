//! OpenAI translator implementation
//!
//! Translates between the canonical model and OpenAI's chat completion API format.
//! The system prompt stays inline as a `system` message and images are sent as
//! `data:` URIs under `image_url`.

use serde::{Deserialize, Serialize};

use super::{merge_extra, MessageTranslator, TranslationError};
use crate::native::conversation::Conversation;
use crate::native::params::{ModelParams, StopSequence};
use crate::native::response::Completion;
use crate::native::types::{content_text, ContentItem, FinishReason, Message};

/// OpenAI API translator
#[derive(Debug, Clone, Default)]
pub struct OpenAITranslator;

impl OpenAITranslator {
    /// Create a new OpenAI translator
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
struct OpenAIImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum OpenAIMessage {
    System { content: String },
    User { content: Vec<OpenAIContentPart> },
    Assistant { content: String },
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a StopSequence>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

fn to_content_part(item: &ContentItem) -> OpenAIContentPart {
    match item {
        ContentItem::Text { text } => OpenAIContentPart::Text { text: text.clone() },
        ContentItem::Image { source } => OpenAIContentPart::ImageUrl {
            image_url: OpenAIImageUrl {
                url: source.to_data_uri(),
            },
        },
    }
}

fn to_wire_message(message: &Message) -> OpenAIMessage {
    match message {
        Message::System { content } => OpenAIMessage::System {
            content: content.clone(),
        },
        Message::User { content } => OpenAIMessage::User {
            content: content.iter().map(to_content_part).collect(),
        },
        Message::Assistant { content, .. } => OpenAIMessage::Assistant {
            content: content_text(content),
        },
    }
}

impl MessageTranslator for OpenAITranslator {
    fn translate_request(
        &self,
        model: &str,
        conversation: &Conversation,
        params: &ModelParams,
    ) -> Result<serde_json::Value, TranslationError> {
        if conversation.is_empty() {
            return Err(TranslationError::NoUserMessage);
        }

        let request = OpenAIRequest {
            model,
            messages: conversation.messages().iter().map(to_wire_message).collect(),
            max_tokens: params.max_output_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stop: params.stop.as_ref(),
        };

        let mut body = serde_json::to_value(&request)?;
        merge_extra(&mut body, params)?;
        Ok(body)
    }

    fn translate_response(
        &self,
        response: serde_json::Value,
    ) -> Result<Completion, TranslationError> {
        let response: OpenAIResponse = serde_json::from_value(response)?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            TranslationError::MalformedResponse("response contains no choices".to_string())
        })?;

        let finish_reason = self.translate_stop_reason(choice.finish_reason.as_deref());
        Ok(Completion::new(
            choice.message.content.unwrap_or_default(),
            finish_reason,
        ))
    }

    fn translate_stop_reason(&self, reason: Option<&str>) -> FinishReason {
        // OpenAI uses: stop, length, content_filter, function_call, tool_calls
        match reason {
            Some("stop") | Some("stop_sequence") => FinishReason::Complete,
            Some("length") => FinishReason::Truncated,
            Some("content_filter") => FinishReason::ContentFiltered,
            Some("function_call") | Some("tool_calls") => FinishReason::ToolCallRequested,
            None | Some("null") => FinishReason::Empty,
            Some(_) => FinishReason::Unknown,
        }
    }
}
