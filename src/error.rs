//! Error types for Colloquy
//!
//! This module defines the error taxonomy shared by adapters, the registry
//! and the completion driver.

use thiserror::Error;

use crate::native::translate::TranslationError;
use crate::registry::Vendor;

/// Errors raised while resolving a vendor/model pair or validating parameters.
///
/// These fail at construction time and are never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    #[error("Model {model} is not supported by {vendor}")]
    UnsupportedModel { vendor: Vendor, model: String },

    #[error("Invalid model parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid client configuration: {0}")]
    InvalidClient(String),
}

/// Library-level errors
#[derive(Debug, Error)]
pub enum ColloquyError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Network or server-side failure that survived every retry attempt
    #[error("Transient network error from {vendor}: {message}")]
    TransientNetwork { vendor: Vendor, message: String },

    /// Vendor rejected the request (bad request, authentication, ...)
    #[error("{vendor} API error {status}: {body}")]
    Upstream {
        vendor: Vendor,
        status: u16,
        body: String,
    },

    #[error("Model generated content that violates the content policy")]
    ContentPolicyViolation,

    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    #[error("Model did not generate any content")]
    EmptyGeneration,

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Failed to parse {vendor} response: {message}")]
    Parse { vendor: Vendor, message: String },

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Cannot compact conversation: {0}")]
    Compaction(String),
}

impl ColloquyError {
    /// Whether the adapter retry policy should attempt the call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, ColloquyError::TransientNetwork { .. })
    }

    /// Short machine-readable code, used as a structured logging field
    pub fn code(&self) -> &'static str {
        match self {
            ColloquyError::Configuration(_) => "configuration_error",
            ColloquyError::TransientNetwork { .. } => "transient_network_error",
            ColloquyError::Upstream { .. } => "upstream_error",
            ColloquyError::ContentPolicyViolation => "content_policy_violation",
            ColloquyError::UnsupportedCapability(_) => "unsupported_capability",
            ColloquyError::EmptyGeneration => "empty_generation",
            ColloquyError::Precondition(_) => "precondition_error",
            ColloquyError::Parse { .. } => "parse_error",
            ColloquyError::Translation(_) => "translation_error",
            ColloquyError::InvalidConversation(_) => "invalid_conversation",
            ColloquyError::Compaction(_) => "compaction_error",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ColloquyError>;
