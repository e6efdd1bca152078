//! Colloquy - vendor-neutral multi-turn LLM conversations
//!
//! A caller holds one canonical conversation and drives it against OpenAI or
//! Anthropic through the same interface. Adapters translate the wire format and
//! retry transient failures; the driver continues truncated generations and
//! compacts the continuation turns afterwards.

pub mod config;
pub mod driver;
pub mod error;
pub mod native;
pub mod provider;
pub mod registry;

pub use crate::config::Config;
pub use crate::driver::{Driver, RunMode, RunOptions, DEFAULT_CONTINUATION_PROMPT};
pub use crate::error::{ColloquyError, ConfigurationError, Result};
pub use crate::native::{
    ContentItem, Conversation, FinishReason, MediaType, Message, ModelParams, StopSequence,
};
pub use crate::provider::{RetryPolicy, VendorAdapter, VendorClient, VendorClients};
pub use crate::registry::Vendor;
