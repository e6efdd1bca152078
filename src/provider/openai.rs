//! OpenAI chat completions adapter

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{retry_with_backoff, RetryPolicy, VendorAdapter, VendorClient};
use crate::error::{ColloquyError, ConfigurationError, Result};
use crate::native::translate::{MessageTranslator, OpenAITranslator};
use crate::native::{Completion, Conversation, ModelParams};
use crate::registry::Vendor;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Adapter for the OpenAI chat completions endpoint
pub struct OpenAIAdapter {
    model: String,
    params: ModelParams,
    client: Arc<VendorClient>,
    retry: RetryPolicy,
    translator: OpenAITranslator,
}

impl OpenAIAdapter {
    pub const ALLOWED_MODELS: &'static [&'static str] =
        &["gpt-4o", "gpt-4o-mini", "gpt-4-vision-preview"];

    /// Fails with `UnsupportedModel` for models outside the allow-list and
    /// with a parameter error for invalid params.
    pub fn new(
        model: &str,
        params: ModelParams,
        client: Arc<VendorClient>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if !Self::ALLOWED_MODELS.contains(&model) {
            return Err(ConfigurationError::UnsupportedModel {
                vendor: Vendor::OpenAI,
                model: model.to_string(),
            }
            .into());
        }
        params.validate()?;

        Ok(Self {
            model: model.to_string(),
            params,
            client,
            retry,
            translator: OpenAITranslator::new(),
        })
    }
}

#[async_trait]
impl VendorAdapter for OpenAIAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAI
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

    #[instrument(skip(self, body), fields(vendor = "openai", model = %self.model))]
    async fn send(&self, body: &Value) -> Result<Value> {
        let client = &self.client;
        retry_with_backoff(&self.retry, move || {
            client.post_json(CHAT_COMPLETIONS_PATH, body)
        })
        .await
    }

    fn parse(&self, response: Value) -> Result<Completion> {
        self.translator
            .translate_response(response)
            .map_err(|e| ColloquyError::Parse {
                vendor: Vendor::OpenAI,
                message: e.to_string(),
            })
    }
}
