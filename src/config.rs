//! Configuration management for Colloquy
//!
//! Configuration is loaded from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::provider::RetryPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API URL
    pub openai_api_url: String,
    /// OpenAI API key. Not validated here; a missing key surfaces as an
    /// authentication failure on the first call.
    pub openai_api_key: Option<String>,

    /// Anthropic API URL
    pub anthropic_api_url: String,
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,
    /// Value sent in the `anthropic-version` header
    pub anthropic_version: String,

    /// Per-request HTTP timeout (in seconds)
    pub request_timeout_seconds: u64,

    /// Total attempts per network call, including the first
    pub retry_max_attempts: u32,
    /// Wait before the first retry (in seconds)
    pub retry_initial_backoff_seconds: u64,
    /// Upper bound for any single wait (in seconds)
    pub retry_max_backoff_seconds: u64,

    /// Vendor used by the chat binary
    pub default_vendor: String,
    /// Model used by the chat binary
    pub default_model: String,
    /// System prompt used by the chat binary
    pub system_prompt: String,
    /// Optional output token budget for the chat binary
    pub max_output_tokens: Option<u32>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_url: env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),

            anthropic_api_url: env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").ok(),
            anthropic_version: env::var("ANTHROPIC_VERSION")
                .unwrap_or_else(|_| "2023-06-01".to_string()),

            request_timeout_seconds: env::var("COLLOQUY_REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid COLLOQUY_REQUEST_TIMEOUT_SECONDS")?,

            retry_max_attempts: env::var("COLLOQUY_RETRY_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .context("Invalid COLLOQUY_RETRY_MAX_ATTEMPTS")?,
            retry_initial_backoff_seconds: env::var("COLLOQUY_RETRY_INITIAL_BACKOFF_SECONDS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid COLLOQUY_RETRY_INITIAL_BACKOFF_SECONDS")?,
            retry_max_backoff_seconds: env::var("COLLOQUY_RETRY_MAX_BACKOFF_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid COLLOQUY_RETRY_MAX_BACKOFF_SECONDS")?,

            default_vendor: env::var("COLLOQUY_VENDOR").unwrap_or_else(|_| "openai".to_string()),
            default_model: env::var("COLLOQUY_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            system_prompt: env::var("COLLOQUY_SYSTEM_PROMPT")
                .unwrap_or_else(|_| "You are a helpful assistant.".to_string()),
            max_output_tokens: env::var("COLLOQUY_MAX_TOKENS")
                .ok()
                .map(|v| v.parse())
                .transpose()
                .context("Invalid COLLOQUY_MAX_TOKENS")?,
        })
    }

    /// Retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts.max(1),
            initial_backoff: Duration::from_secs(self.retry_initial_backoff_seconds),
            max_backoff: Duration::from_secs(self.retry_max_backoff_seconds),
            ..RetryPolicy::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}
