//! Generation parameters
//!
//! Recognized options are explicit, range-checked fields. Anything
//! vendor-specific goes through the opaque `extra` map and is merged into the
//! wire request verbatim.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ColloquyError, ConfigurationError, Result};

/// Keys that would enable function/tool calling, which this crate does not support
const TOOL_CALLING_KEYS: &[&str] = &["tools", "tool_choice", "functions", "function_call"];

/// Keys the adapters manage themselves and callers must not override
const RESERVED_KEYS: &[&str] = &["model", "messages", "system", "stream"];

/// Wire names of the typed options; these must be set through their fields
const TYPED_KEYS: &[&str] = &[
    "max_tokens",
    "max_output_tokens",
    "temperature",
    "top_p",
    "stop",
    "stop_sequences",
];

/// Stop sequence - can be a single string or array of strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StopSequence {
    /// Single stop sequence
    Single(String),
    /// Multiple stop sequences
    Multiple(Vec<String>),
}

impl StopSequence {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StopSequence::Single(s) => vec![s.clone()],
            StopSequence::Multiple(v) => v.clone(),
        }
    }
}

/// Model generation parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelParams {
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling parameter (0.0 to 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequence>,
    /// Vendor-specific passthrough fields
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

fn invalid(name: &str, reason: impl Into<String>) -> ColloquyError {
    ConfigurationError::InvalidParameter {
        name: name.to_string(),
        reason: reason.into(),
    }
    .into()
}

impl ModelParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop(mut self, stop: StopSequence) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Build parameters from a loose string-keyed map.
    ///
    /// `max_tokens` and `max_output_tokens` are accepted as aliases. Unrecognized
    /// keys land in `extra`. The result is validated before it is returned.
    pub fn from_map(map: HashMap<String, Value>) -> Result<Self> {
        let mut params = Self::default();

        for (key, value) in map {
            match key.as_str() {
                "max_tokens" | "max_output_tokens" => {
                    let tokens = value
                        .as_u64()
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| invalid(&key, "must be a positive integer"))?;
                    params.max_output_tokens = Some(tokens);
                }
                "temperature" => {
                    params.temperature =
                        Some(value.as_f64().ok_or_else(|| invalid(&key, "must be a number"))?);
                }
                "top_p" => {
                    params.top_p =
                        Some(value.as_f64().ok_or_else(|| invalid(&key, "must be a number"))?);
                }
                "stop" => {
                    let stop: StopSequence = serde_json::from_value(value).map_err(|_| {
                        invalid(&key, "must be a string or an array of strings")
                    })?;
                    params.stop = Some(stop);
                }
                _ => {
                    params.extra.insert(key, value);
                }
            }
        }

        params.validate()?;
        Ok(params)
    }

    /// Check ranges and reject options this crate cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_output_tokens == Some(0) {
            return Err(invalid("max_output_tokens", "must be at least 1"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(invalid("temperature", format!("{} is outside 0.0..=2.0", t)));
            }
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid("top_p", format!("{} is outside 0.0..=1.0", p)));
            }
        }
        for key in self.extra.keys() {
            if TOOL_CALLING_KEYS.contains(&key.as_str()) {
                return Err(ColloquyError::UnsupportedCapability(format!(
                    "function/tool calling is not supported (parameter `{}`)",
                    key
                )));
            }
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(invalid(key, "is managed by the adapter"));
            }
            if TYPED_KEYS.contains(&key.as_str()) {
                return Err(invalid(key, "must be set through its typed field, not `extra`"));
            }
        }
        Ok(())
    }
}
