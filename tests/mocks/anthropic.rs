//! Mock Anthropic messages API
//!
//! Provides wiremock-based mocks for `POST /v1/messages`.

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, ResponseTemplate,
};

pub const MESSAGES_PATH: &str = "/v1/messages";

/// Mock Anthropic server wrapper
pub struct MockAnthropic {
    server: MockServer,
}

impl MockAnthropic {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Base URL to configure the Anthropic client with
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Respond to every request carrying the version header with `response`
    pub async fn mock_message(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Respond with `response` for the next `times` requests only
    pub async fn mock_message_times(&self, response: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    /// Respond with an error status for the next `times` requests
    pub async fn mock_error_times(&self, status: u16, times: u64) {
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(AnthropicTestData::error(status)),
            )
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_error(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(MESSAGES_PATH))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(AnthropicTestData::error(status)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// JSON bodies of every request received, in order
    pub async fn request_bodies(&self) -> Vec<Value> {
        self.received_requests()
            .await
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

/// Canned Anthropic payloads
pub struct AnthropicTestData;

impl AnthropicTestData {
    pub fn message(text: &str, stop_reason: Option<&str>) -> Value {
        json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-haiku-20240307",
            "content": [{"type": "text", "text": text}],
            "stop_reason": stop_reason,
            "stop_sequence": null,
            "usage": {"input_tokens": 10, "output_tokens": 4}
        })
    }

    /// Response mixing text with a tool_use block
    pub fn tool_use_message() -> Value {
        json!({
            "id": "msg_tool",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me look that up."},
                {"type": "tool_use", "id": "toolu_1", "name": "lookup", "input": {}}
            ],
            "stop_reason": "tool_use"
        })
    }

    pub fn error(status: u16) -> Value {
        let (error_type, message) = match status {
            400 => ("invalid_request_error", "messages: roles must alternate"),
            401 => ("authentication_error", "invalid x-api-key"),
            429 => ("rate_limit_error", "Number of requests has exceeded your rate limit"),
            529 => ("overloaded_error", "Overloaded"),
            _ => ("api_error", "Internal server error"),
        };
        json!({"type": "error", "error": {"type": error_type, "message": message}})
    }
}
