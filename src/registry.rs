//! Vendor registry
//!
//! Maps a closed set of vendor identifiers to their model allow-lists and
//! adapter constructors. Adding a vendor means adding a `Vendor` variant, its
//! catalog entry and its constructor arm here; the driver does not change.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigurationError, Result};
use crate::native::ModelParams;
use crate::provider::{AnthropicAdapter, OpenAIAdapter, VendorAdapter, VendorClients};

/// Supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl Vendor {
    /// Every registered vendor, in catalog order
    pub const ALL: [Vendor; 2] = [Vendor::OpenAI, Vendor::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::OpenAI => "openai",
            Vendor::Anthropic => "anthropic",
        }
    }

    /// Static model allow-list for this vendor
    pub fn supported_models(&self) -> &'static [&'static str] {
        match self {
            Vendor::OpenAI => OpenAIAdapter::ALLOWED_MODELS,
            Vendor::Anthropic => AnthropicAdapter::ALLOWED_MODELS,
        }
    }

    pub fn supports(&self, model: &str) -> bool {
        self.supported_models().contains(&model)
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vendor {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Vendor::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownVendor(s.to_string()))
    }
}

/// The full capability catalog: each vendor with its allowed models
pub fn catalog() -> Vec<(Vendor, &'static [&'static str])> {
    Vendor::ALL
        .into_iter()
        .map(|v| (v, v.supported_models()))
        .collect()
}

/// Every supported model as `vendor/model`
pub fn flat_vendor_models() -> Vec<String> {
    catalog()
        .into_iter()
        .flat_map(|(vendor, models)| models.iter().map(move |m| format!("{}/{}", vendor, m)))
        .collect()
}

/// Check a vendor/model pair against the catalog without building anything
pub fn validate(vendor: &str, model: &str) -> std::result::Result<Vendor, ConfigurationError> {
    let vendor: Vendor = vendor.parse()?;
    if !vendor.supports(model) {
        return Err(ConfigurationError::UnsupportedModel {
            vendor,
            model: model.to_string(),
        });
    }
    Ok(vendor)
}

/// Resolve a vendor/model pair to a ready adapter
///
/// Unknown vendors fail with `UnknownVendor`, unlisted models with
/// `UnsupportedModel`; both before any client is touched.
pub fn resolve(
    vendor: &str,
    model: &str,
    params: ModelParams,
    clients: &VendorClients,
) -> Result<Box<dyn VendorAdapter>> {
    let vendor = validate(vendor, model)?;
    debug!(vendor = %vendor, model = %model, "Resolving vendor adapter");

    let adapter: Box<dyn VendorAdapter> = match vendor {
        Vendor::OpenAI => Box::new(OpenAIAdapter::new(
            model,
            params,
            clients.client(vendor),
            clients.retry().clone(),
        )?),
        Vendor::Anthropic => Box::new(AnthropicAdapter::new(
            model,
            params,
            clients.client(vendor),
            clients.retry().clone(),
        )?),
    };

    info!(vendor = %vendor, model = %model, "Vendor adapter ready");
    Ok(adapter)
}
