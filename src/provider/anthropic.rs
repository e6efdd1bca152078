//! Anthropic messages adapter
//!
//! Anthropic requires `max_tokens` on every request, so the adapter fills in
//! `DEFAULT_MAX_TOKENS` when the caller leaves it unset.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{retry_with_backoff, RetryPolicy, VendorAdapter, VendorClient};
use crate::error::{ColloquyError, ConfigurationError, Result};
use crate::native::translate::{AnthropicTranslator, MessageTranslator};
use crate::native::{Completion, Conversation, ModelParams};
use crate::registry::Vendor;

const MESSAGES_PATH: &str = "/messages";

pub struct AnthropicAdapter {
    model: String,
    params: ModelParams,
    client: Arc<VendorClient>,
    retry: RetryPolicy,
    translator: AnthropicTranslator,
}

impl AnthropicAdapter {
    pub const ALLOWED_MODELS: &'static [&'static str] = &[
        "claude-3-5-sonnet-20240620",
        "claude-3-opus-20240229",
        "claude-3-haiku-20240307",
    ];

    /// Output budget applied when the caller does not set one
    pub const DEFAULT_MAX_TOKENS: u32 = 4000;

    pub fn new(
        model: &str,
        mut params: ModelParams,
        client: Arc<VendorClient>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if !Self::ALLOWED_MODELS.contains(&model) {
            return Err(ConfigurationError::UnsupportedModel {
                vendor: Vendor::Anthropic,
                model: model.to_string(),
            }
            .into());
        }
        params.validate()?;

        if params.max_output_tokens.is_none() {
            debug!(
                max_tokens = Self::DEFAULT_MAX_TOKENS,
                "Applying default Anthropic max_tokens"
            );
            params.max_output_tokens = Some(Self::DEFAULT_MAX_TOKENS);
        }

        Ok(Self {
            model: model.to_string(),
            params,
            client,
            retry,
            translator: AnthropicTranslator::new(),
        })
    }
}

#[async_trait]
impl VendorAdapter for AnthropicAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn params(&self) -> &ModelParams {
        &self.params
    }

    fn translate(&self, conversation: &Conversation) -> Result<Value> {
        Ok(self
            .translator
            .translate_request(&self.model, conversation, &self.params)?)
    }

    #[instrument(skip(self, body), fields(vendor = "anthropic", model = %self.model))]
    async fn send(&self, body: &Value) -> Result<Value> {
        let client = &self.client;
        retry_with_backoff(&self.retry, move || client.post_json(MESSAGES_PATH, body)).await
    }

    fn parse(&self, response: Value) -> Result<Completion> {
        self.translator
            .translate_response(response)
            .map_err(|e| ColloquyError::Parse {
                vendor: Vendor::Anthropic,
                message: e.to_string(),
            })
    }
}
