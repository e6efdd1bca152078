//! Translation layer for converting between the canonical model and vendor formats
//!
//! This module provides the `MessageTranslator` trait and implementations for
//! translating conversations and responses between the canonical model and
//! vendor-specific JSON formats (OpenAI, Anthropic).

pub mod anthropic;
pub mod openai;

use thiserror::Error;

use super::conversation::Conversation;
use super::params::ModelParams;
use super::response::Completion;
use super::types::FinishReason;

/// Errors that can occur during message translation
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Message format is invalid for the target vendor
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// The vendor takes the system prompt out of band and none was found
    #[error("Conversation must start with a system message")]
    MissingSystemMessage,

    /// No user message in the conversation
    #[error("Conversation must contain at least one user message")]
    NoUserMessage,

    /// First non-system message must be from user (required by Anthropic)
    #[error("First non-system message must be from user role")]
    FirstMustBeUser,

    /// Messages must alternate between user and assistant (required by Anthropic)
    #[error("Messages must alternate between user and assistant roles")]
    MustAlternate,

    /// Vendor response does not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Trait for translating between the canonical model and vendor-specific formats
///
/// Implementations handle the bidirectional conversion between the canonical
/// conversation types and a vendor's JSON body, so the rest of the crate only
/// ever deals with one representation.
pub trait MessageTranslator: Send + Sync {
    /// Translate a conversation into the vendor's request body
    ///
    /// # Errors
    ///
    /// Returns `TranslationError` if:
    /// - The conversation cannot be expressed in the vendor's format
    /// - The system message is missing where the vendor requires it
    /// - JSON serialization fails
    fn translate_request(
        &self,
        model: &str,
        conversation: &Conversation,
        params: &ModelParams,
    ) -> Result<serde_json::Value, TranslationError>;

    /// Translate a vendor response body into text plus canonical finish reason
    ///
    /// # Errors
    ///
    /// Returns `TranslationError` if the response shape is unexpected.
    fn translate_response(
        &self,
        response: serde_json::Value,
    ) -> Result<Completion, TranslationError>;

    /// Map a vendor stop reason to the canonical finish reason
    fn translate_stop_reason(&self, reason: Option<&str>) -> FinishReason;
}

/// Merge caller passthrough fields into a serialized request body
pub(crate) fn merge_extra(
    body: &mut serde_json::Value,
    params: &ModelParams,
) -> Result<(), TranslationError> {
    let object = body.as_object_mut().ok_or_else(|| {
        TranslationError::InvalidMessageFormat("request body must be a JSON object".to_string())
    })?;
    for (key, value) in &params.extra {
        object.insert(key.clone(), value.clone());
    }
    Ok(())
}

// Re-export key types for convenience
pub use anthropic::AnthropicTranslator;
pub use openai::OpenAITranslator;
