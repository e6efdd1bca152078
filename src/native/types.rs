//! Core message types for the canonical conversation model
//!
//! Defines the fundamental, vendor-agnostic types: roles, content items,
//! messages and the canonical finish reason.

use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message providing instructions or context
    System,
    /// User message from the human
    User,
    /// Assistant message from the model
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Encoding of embedded image data. Only base64 is supported.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    #[default]
    Base64,
}

impl ImageEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageEncoding::Base64 => "base64",
        }
    }
}

/// Media type of embedded image data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
        }
    }
}

/// Inline image payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSource {
    /// Encoding of `data` (serialized as `type`)
    #[serde(rename = "type", default)]
    pub encoding: ImageEncoding,
    /// Image media type
    pub media_type: MediaType,
    /// Encoded image bytes
    pub data: String,
}

impl ImageSource {
    /// Render as a `data:` URI, e.g. `data:image/png;base64,iVBOR...`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};{},{}",
            self.media_type.as_str(),
            self.encoding.as_str(),
            self.data
        )
    }
}

/// A single item of user or assistant content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Text content
    Text {
        /// The text content
        text: String,
    },
    /// Base64 image content
    Image {
        /// The image payload
        source: ImageSource,
    },
}

impl ContentItem {
    /// Create a text content item
    pub fn text(text: impl Into<String>) -> Self {
        ContentItem::Text { text: text.into() }
    }

    /// Create a base64 image content item
    pub fn image(media_type: MediaType, data: impl Into<String>) -> Self {
        ContentItem::Image {
            source: ImageSource {
                encoding: ImageEncoding::Base64,
                media_type,
                data: data.into(),
            },
        }
    }

    /// Text of this item, or None for images
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { text } => Some(text.as_str()),
            ContentItem::Image { .. } => None,
        }
    }
}

/// Concatenate the text items of a content sequence, skipping images
pub fn content_text(content: &[ContentItem]) -> String {
    content
        .iter()
        .filter_map(ContentItem::as_text)
        .collect::<Vec<_>>()
        .join("")
}

/// Vendor-independent classification of why a generation call ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model reached a natural stop
    Complete,
    /// Output was cut off by the token budget
    Truncated,
    /// The vendor refused or filtered the output on policy grounds
    ContentFiltered,
    /// The model asked to invoke a function/tool
    ToolCallRequested,
    /// No completion signal was reported
    Empty,
    /// A signal this crate does not recognize
    Unknown,
}

impl FinishReason {
    /// Stops that end an until-completion run with an error
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            FinishReason::ContentFiltered | FinishReason::ToolCallRequested | FinishReason::Empty
        )
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Complete => write!(f, "complete"),
            FinishReason::Truncated => write!(f, "truncated"),
            FinishReason::ContentFiltered => write!(f, "content_filtered"),
            FinishReason::ToolCallRequested => write!(f, "tool_call_requested"),
            FinishReason::Empty => write!(f, "empty"),
            FinishReason::Unknown => write!(f, "unknown"),
        }
    }
}

/// A conversation message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt
    System { content: String },
    /// User turn
    User { content: Vec<ContentItem> },
    /// Assistant turn together with the reason generation ended
    Assistant {
        content: Vec<ContentItem>,
        finish_reason: FinishReason,
    },
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Message::System {
            content: text.into(),
        }
    }

    /// Create a user message from content items
    pub fn user(content: Vec<ContentItem>) -> Self {
        Message::User { content }
    }

    /// Create a user message holding a single text item
    pub fn user_text(text: impl Into<String>) -> Self {
        Message::User {
            content: vec![ContentItem::text(text)],
        }
    }

    /// Create an assistant message holding a single text item
    pub fn assistant_text(text: impl Into<String>, finish_reason: FinishReason) -> Self {
        Message::Assistant {
            content: vec![ContentItem::text(text)],
            finish_reason,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
        }
    }

    /// Text content of the message; images are skipped
    pub fn text(&self) -> String {
        match self {
            Message::System { content } => content.clone(),
            Message::User { content } | Message::Assistant { content, .. } => {
                content_text(content)
            }
        }
    }

    /// Content items for user/assistant messages, None for system
    pub fn content_items(&self) -> Option<&[ContentItem]> {
        match self {
            Message::System { .. } => None,
            Message::User { content } | Message::Assistant { content, .. } => Some(content),
        }
    }
}
