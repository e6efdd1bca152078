//! Vendor HTTP client
//!
//! Thin wrapper over a shared `reqwest::Client` that knows one vendor's base
//! URL and authentication headers, and classifies failures into transient and
//! permanent errors for the retry layer.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::error::{ColloquyError, ConfigurationError, Result};
use crate::registry::Vendor;

/// Header carrying the Anthropic API key
const ANTHROPIC_API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the Anthropic API version
const ANTHROPIC_VERSION_HEADER: &str = "anthropic-version";

/// HTTP client bound to a single vendor
#[derive(Debug, Clone)]
pub struct VendorClient {
    client: reqwest::Client,
    vendor: Vendor,
    base_url: String,
    headers: HeaderMap,
}

fn header_value(name: &str, value: &str) -> std::result::Result<HeaderValue, ConfigurationError> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigurationError::InvalidClient(format!("invalid value for header {}", name)))
}

impl VendorClient {
    /// Create a client with a prepared header set
    pub fn new(
        client: reqwest::Client,
        vendor: Vendor,
        base_url: impl Into<String>,
        mut headers: HeaderMap,
    ) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            client,
            vendor,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers,
        }
    }

    /// OpenAI client using `Authorization: Bearer <key>`
    ///
    /// A missing key sends no authorization header; the vendor then rejects the
    /// first call with an authentication error.
    pub fn openai(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<&str>,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                header_value(AUTHORIZATION.as_str(), &format!("Bearer {}", key))?,
            );
        }
        Ok(Self::new(client, Vendor::OpenAI, base_url, headers))
    }

    /// Anthropic client using `x-api-key` plus `anthropic-version`
    pub fn anthropic(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<&str>,
        version: &str,
    ) -> std::result::Result<Self, ConfigurationError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                HeaderName::from_static(ANTHROPIC_API_KEY_HEADER),
                header_value(ANTHROPIC_API_KEY_HEADER, key)?,
            );
        }
        headers.insert(
            HeaderName::from_static(ANTHROPIC_VERSION_HEADER),
            header_value(ANTHROPIC_VERSION_HEADER, version)?,
        );
        Ok(Self::new(client, Vendor::Anthropic, base_url, headers))
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to `path` and return the decoded JSON response
    ///
    /// Connection failures, 5xx, 408 and 429 come back as `TransientNetwork`;
    /// any other non-success status is `Upstream` and carries the body.
    #[instrument(skip(self, body), fields(vendor = %self.vendor))]
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending vendor request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Vendor request failed to send");
                ColloquyError::TransientNetwork {
                    vendor: self.vendor,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        debug!(status = %status, "Vendor response status");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Vendor request failed");

            if is_transient_status(status) {
                return Err(ColloquyError::TransientNetwork {
                    vendor: self.vendor,
                    message: format!("HTTP {}: {}", status.as_u16(), text),
                });
            }

            return Err(ColloquyError::Upstream {
                vendor: self.vendor,
                status: status.as_u16(),
                body: text,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ColloquyError::TransientNetwork {
                vendor: self.vendor,
                message: e.to_string(),
            })?;

        serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, body = %text, "Failed to parse vendor response");
            ColloquyError::Parse {
                vendor: self.vendor,
                message: e.to_string(),
            }
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}
