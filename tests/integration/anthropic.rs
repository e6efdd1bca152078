//! Anthropic adapter integration tests

use pretty_assertions::assert_eq;
use serde_json::json;

use colloquy::native::translate::TranslationError;
use colloquy::native::Completion;
use colloquy::registry;
use colloquy::{
    ColloquyError, Conversation, FinishReason, Message, ModelParams, StopSequence, Vendor,
    VendorAdapter,
};

use crate::common::{basic_conversation, constants, image_conversation, TestHarness};
use crate::mocks::anthropic::AnthropicTestData;

fn adapter(harness: &TestHarness, params: ModelParams) -> Box<dyn VendorAdapter> {
    registry::resolve("anthropic", constants::ANTHROPIC_MODEL, params, &harness.clients).unwrap()
}

#[tokio::test]
async fn test_request_moves_system_to_top_level() {
    let harness = TestHarness::new().await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::message("Red, yellow, blue.", Some("end_turn")))
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();
    assert_eq!(
        completion,
        Completion::new("Red, yellow, blue.", FinishReason::Complete)
    );

    let requests = harness.anthropic.received_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("x-api-key").unwrap(),
        constants::TEST_ANTHROPIC_API_KEY
    );
    assert_eq!(
        requests[0].headers.get("anthropic-version").unwrap(),
        constants::TEST_ANTHROPIC_VERSION
    );

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["system"], constants::SYSTEM_PROMPT);
    assert_eq!(body["max_tokens"], 4000);
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": [{"type": "text", "text": constants::USER_PROMPT}]}])
    );
}

#[tokio::test]
async fn test_image_sent_as_typed_block() {
    let harness = TestHarness::new().await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::message("A pixel.", Some("end_turn")))
        .await;

    adapter(&harness, ModelParams::default())
        .complete(&image_conversation())
        .await
        .unwrap();

    let bodies = harness.anthropic.request_bodies().await;
    assert_eq!(
        bodies[0]["messages"][0]["content"][1],
        json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": "image/png",
                "data": constants::TINY_PNG_BASE64
            }
        })
    );
}

#[tokio::test]
async fn test_stop_sequences_and_explicit_max_tokens() {
    let harness = TestHarness::new().await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::message("one", Some("stop_sequence")))
        .await;

    let params = ModelParams::default()
        .with_max_output_tokens(50)
        .with_stop(StopSequence::Multiple(vec!["\n\n".to_string(), "END".to_string()]));
    let completion = adapter(&harness, params)
        .complete(&basic_conversation())
        .await
        .unwrap();
    assert_eq!(completion.finish_reason, FinishReason::Complete);

    let bodies = harness.anthropic.request_bodies().await;
    assert_eq!(bodies[0]["max_tokens"], 50);
    assert_eq!(bodies[0]["stop_sequences"], json!(["\n\n", "END"]));
}

#[tokio::test]
async fn test_stop_reason_mapping() {
    let cases = [
        (Some("end_turn"), FinishReason::Complete),
        (Some("stop_sequence"), FinishReason::Complete),
        (Some("max_tokens"), FinishReason::Truncated),
        (Some("refusal"), FinishReason::ContentFiltered),
        (Some("tool_use"), FinishReason::ToolCallRequested),
        (Some("null"), FinishReason::Empty),
        (None, FinishReason::Empty),
        (Some("pause_turn"), FinishReason::Unknown),
    ];

    for (wire, expected) in cases {
        let harness = TestHarness::new().await;
        harness
            .anthropic
            .mock_message(AnthropicTestData::message("text", wire))
            .await;

        let completion = adapter(&harness, ModelParams::default())
            .complete(&basic_conversation())
            .await
            .unwrap();

        assert_eq!(completion.finish_reason, expected, "wire reason {:?}", wire);
    }
}

#[tokio::test]
async fn test_tool_use_blocks_are_skipped() {
    let harness = TestHarness::new().await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::tool_use_message())
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(
        completion,
        Completion::new("Let me look that up.", FinishReason::ToolCallRequested)
    );
}

#[tokio::test]
async fn test_missing_system_message_fails_before_network() {
    let harness = TestHarness::new().await;
    let conversation = Conversation::from_messages(vec![Message::user_text("hello")]).unwrap();

    let result = adapter(&harness, ModelParams::default())
        .complete(&conversation)
        .await;

    assert!(matches!(
        result,
        Err(ColloquyError::Translation(TranslationError::MissingSystemMessage))
    ));
    assert!(harness.anthropic.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_non_alternating_turns_fail_before_network() {
    let harness = TestHarness::new().await;
    let conversation = Conversation::from_messages(vec![
        Message::system(constants::SYSTEM_PROMPT),
        Message::user_text("one"),
        Message::user_text("two"),
    ])
    .unwrap();

    let result = adapter(&harness, ModelParams::default())
        .complete(&conversation)
        .await;

    assert!(matches!(
        result,
        Err(ColloquyError::Translation(TranslationError::MustAlternate))
    ));
    assert!(harness.anthropic.received_requests().await.is_empty());
}

#[tokio::test]
async fn test_overloaded_is_retried() {
    let harness = TestHarness::new().await;
    harness.anthropic.mock_error_times(529, 2).await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::message("finally", Some("end_turn")))
        .await;

    let completion = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await
        .unwrap();

    assert_eq!(completion.text, "finally");
    assert_eq!(harness.anthropic.received_requests().await.len(), 3);
}

#[tokio::test]
async fn test_authentication_error_is_not_retried() {
    let harness = TestHarness::new().await;
    harness.anthropic.mock_error(401).await;

    let result = adapter(&harness, ModelParams::default())
        .complete(&basic_conversation())
        .await;

    match result {
        Err(ColloquyError::Upstream { vendor, status, body }) => {
            assert_eq!(vendor, Vendor::Anthropic);
            assert_eq!(status, 401);
            assert!(body.contains("authentication_error"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
    assert_eq!(harness.anthropic.received_requests().await.len(), 1);
}
