//! OpenAI adapter integration tests
//!
//! Exercises the adapter over HTTP:
//! - request body and header shape
//! - finish reason mapping from canned responses
//! - retry behaviour for transient and permanent failures

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use colloquy::native::Completion;
use colloquy::provider::OpenAIAdapter;
use colloquy::registry;
use colloquy::{
    ColloquyError, FinishReason, ModelParams, RetryPolicy, StopSequence, Vendor, VendorAdapter,
    VendorClient,
};

use crate::common::{basic_conversation, constants, image_conversation, TestHarness};
use crate::mocks::openai::{MockOpenAI, OpenAITestData};

fn adapter(harness: &TestHarness, params: ModelParams) -> Box<dyn VendorAdapter> {
    registry::resolve("openai", constants::OPENAI_MODEL, params, &harness.clients).unwrap()
}

// =============================================================================
// Request shape
// =============================================================================

#[tokio::test]
async fn test_request_keeps_system_inline_and_sends_params() {
    let harness = TestHarness::new().await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("Red, yellow and blue.", Some("stop")))
        .await;

    let params = ModelParams::default()
        .with_max_output_tokens(128)
        .with_temperature(0.5)
        .with_stop(StopSequence::Single("END".to_string()));
    let completion = adapter(&harness, params)
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(
        completion,
        Completion::new("Red, yellow and blue.", FinishReason::Complete)
    );

    let requests = harness.openai.received_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("authorization").unwrap(),
        &format!("Bearer {}", constants::TEST_OPENAI_API_KEY)
    );

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], constants::OPENAI_MODEL);
    assert_eq!(body["max_tokens"], 128);
    assert_eq!(body["temperature"], 0.5);
    assert_eq!(body["stop"], "END");
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": constants::SYSTEM_PROMPT},
            {"role": "user", "content": [{"type": "text", "text": constants::USER_PROMPT}]}
        ])
    );
}

#[tokio::test]
async fn test_image_sent_as_data_uri() {
    let harness = TestHarness::new().await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("A single pixel.", Some("stop")))
        .await;

    adapter(&harness, ModelParams::default())
        .complete(&image_conversation())
        .await
        .unwrap();

    let bodies = harness.openai.request_bodies().await;
    let content = &bodies[0]["messages"][1]["content"];
    assert_eq!(content[0], json!({"type": "text", "text": "What is in this picture?"}));
    assert_eq!(
        content[1],
        json!({
            "type": "image_url",
            "image_url": {"url": format!("data:image/png;base64,{}", constants::TINY_PNG_BASE64)}
        })
    );
}

#[tokio::test]
async fn test_extra_params_passed_through() {
    let harness = TestHarness::new().await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("ok", Some("stop")))
        .await;

    let params = ModelParams::default().with_extra("seed", json!(7));
    adapter(&harness, params)
        .complete(&basic_conversation())
        .await
        .unwrap();

    let bodies = harness.openai.request_bodies().await;
    assert_eq!(bodies[0]["seed"], 7);
}

// =============================================================================
// Response parsing
// =============================================================================

#[tokio::test]
async fn test_finish_reason_mapping() {
    let cases = [
        (Some("stop"), FinishReason::Complete),
        (Some("stop_sequence"), FinishReason::Complete),
        (Some("length"), FinishReason::Truncated),
        (Some("content_filter"), FinishReason::ContentFiltered),
        (Some("function_call"), FinishReason::ToolCallRequested),
        (Some("tool_calls"), FinishReason::ToolCallRequested),
        (Some("null"), FinishReason::Empty),
        (None, FinishReason::Empty),
        (Some("something_new"), FinishReason::Unknown),
    ];

    for (wire, expected) in cases {
        let harness = TestHarness::new().await;
        harness
            .openai
            .mock_completion(OpenAITestData::completion("text", wire))
            .await;

        let completion = adapter(&harness, ModelParams::default())
            .complete(&basic_conversation())
            .await
            .unwrap();

        assert_eq!(completion.text, "text");
        assert_eq!(completion.finish_reason, expected, "wire reason {:?}", wire);
    }
}

#[tokio::test]
async fn test_null_content_with_tool_calls() {
    let harness = TestHarness::new().await;
    harness
        .openai
        .mock_completion(OpenAITestData::tool_call_completion())
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(completion, Completion::new("", FinishReason::ToolCallRequested));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let harness = TestHarness::new().await;
    harness.openai.mock_invalid_body().await;

    let result = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await;

    assert!(matches!(
        result,
        Err(ColloquyError::Parse { vendor: Vendor::OpenAI, .. })
    ));
    assert_eq!(harness.openai.received_requests().await.len(), 1);
}

// =============================================================================
// Retry behaviour
// =============================================================================

#[tokio::test]
async fn test_two_server_errors_then_success() {
    let harness = TestHarness::new().await;
    harness.openai.mock_error_times(500, 2).await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("third time lucky", Some("stop")))
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(completion.text, "third time lucky");
    assert_eq!(harness.openai.received_requests().await.len(), 3);
}

#[tokio::test]
async fn test_persistent_server_error_surfaces_after_three_attempts() {
    let harness = TestHarness::new().await;
    harness.openai.mock_error(503).await;

    let result = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await;

    match result {
        Err(ColloquyError::TransientNetwork { vendor, message }) => {
            assert_eq!(vendor, Vendor::OpenAI);
            assert!(message.starts_with("HTTP 503"), "message: {}", message);
        }
        other => panic!("expected transient network error, got {:?}", other),
    }
    assert_eq!(harness.openai.received_requests().await.len(), 3);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let harness = TestHarness::new().await;
    harness.openai.mock_error_times(429, 1).await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("after the wait", Some("stop")))
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(completion.text, "after the wait");
    assert_eq!(harness.openai.received_requests().await.len(), 2);
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let harness = TestHarness::new().await;
    harness.openai.mock_error(400).await;

    let result = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await;

    match result {
        Err(ColloquyError::Upstream { vendor, status, body }) => {
            assert_eq!(vendor, Vendor::OpenAI);
            assert_eq!(status, 400);
            assert!(body.contains("Unrecognized request argument"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(harness.openai.received_requests().await.len(), 1);
}

#[tokio::test]
async fn test_missing_key_fails_with_authentication_error() {
    let mock = MockOpenAI::start().await;
    mock.mock_error(401).await;

    let client = VendorClient::openai(reqwest::Client::new(), &mock.base_url(), None).unwrap();
    let adapter = OpenAIAdapter::new(
        constants::OPENAI_MODEL,
        ModelParams::default(),
        Arc::new(client),
        RetryPolicy::without_backoff(3),
    )
    .unwrap();

    let result = adapter.complete(&basic_conversation()).await;

    assert!(matches!(
        result,
        Err(ColloquyError::Upstream { status: 401, .. })
    ));

    let requests = mock.received_requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}
