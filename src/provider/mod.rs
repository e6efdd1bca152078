//! Vendor adapters
//!
//! Defines the `VendorAdapter` trait the driver talks to, plus the shared HTTP
//! clients every adapter is built from.

pub mod anthropic;
pub mod client;
pub mod openai;
pub mod retry;
#[cfg(any(test, feature = "test-utils"))]
pub mod scripted;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::native::{Completion, Conversation, ModelParams};
use crate::registry::Vendor;

pub use anthropic::AnthropicAdapter;
pub use client::VendorClient;
pub use openai::OpenAIAdapter;
pub use retry::{retry_with_backoff, RetryPolicy};
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedAdapter;

/// One vendor/model pair with fixed generation parameters
///
/// Implementations own the translation to and from the vendor wire format and
/// apply the retry policy to the network call. A single `complete` is one round
/// trip; continuation across truncation belongs to the driver.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    fn vendor(&self) -> Vendor;

    fn model(&self) -> &str;

    fn params(&self) -> &ModelParams;

    /// Build the vendor request body for a conversation
    fn translate(&self, conversation: &Conversation) -> Result<Value>;

    /// Perform the network call, retrying transient failures
    async fn send(&self, body: &Value) -> Result<Value>;

    /// Extract text and canonical finish reason from a vendor response
    fn parse(&self, response: Value) -> Result<Completion>;

    /// Translate, send and parse in one step
    async fn complete(&self, conversation: &Conversation) -> Result<Completion> {
        let body = self.translate(conversation)?;
        let response = self.send(&body).await?;
        self.parse(response)
    }
}

/// Shared vendor clients handed to the registry
#[derive(Debug, Clone)]
pub struct VendorClients {
    openai: Arc<VendorClient>,
    anthropic: Arc<VendorClient>,
    retry: RetryPolicy,
}

impl VendorClients {
    pub fn new(openai: VendorClient, anthropic: VendorClient, retry: RetryPolicy) -> Self {
        Self {
            openai: Arc::new(openai),
            anthropic: Arc::new(anthropic),
            retry,
        }
    }

    /// Build both clients over one pooled `reqwest::Client`
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(config.request_timeout())
            .build()?;

        let openai = VendorClient::openai(
            http_client.clone(),
            &config.openai_api_url,
            config.openai_api_key.as_deref(),
        )?;
        let anthropic = VendorClient::anthropic(
            http_client,
            &config.anthropic_api_url,
            config.anthropic_api_key.as_deref(),
            &config.anthropic_version,
        )?;

        Ok(Self::new(openai, anthropic, config.retry_policy()))
    }

    pub fn client(&self, vendor: Vendor) -> Arc<VendorClient> {
        match vendor {
            Vendor::OpenAI => self.openai.clone(),
            Vendor::Anthropic => self.anthropic.clone(),
        }
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Clients pointed at local mock servers, with three attempts and no backoff
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_testing(openai_url: &str, anthropic_url: &str) -> Self {
        let http_client = reqwest::Client::new();
        let openai = VendorClient::openai(http_client.clone(), openai_url, Some("test-openai-key"))
            .expect("static test key is a valid header");
        let anthropic = VendorClient::anthropic(
            http_client,
            anthropic_url,
            Some("test-anthropic-key"),
            "2023-06-01",
        )
        .expect("static test key is a valid header");

        Self::new(openai, anthropic, RetryPolicy::without_backoff(3))
    }
}
