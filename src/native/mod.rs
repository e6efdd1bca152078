//! Canonical conversation model
//!
//! This module defines the vendor-agnostic message format that every adapter
//! translates to/from.

pub mod conversation;
pub mod params;
pub mod response;
pub mod translate;
pub mod types;

// Re-export key types for convenience
pub use conversation::Conversation;
pub use params::{ModelParams, StopSequence};
pub use response::Completion;
pub use types::{
    content_text, ContentItem, FinishReason, ImageEncoding, ImageSource, MediaType, Message, Role,
};
