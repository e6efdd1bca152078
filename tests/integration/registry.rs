//! Registry integration tests

use colloquy::registry::{self, catalog, flat_vendor_models};
use colloquy::{ColloquyError, ConfigurationError, ModelParams, Vendor};

use crate::common::{basic_conversation, TestHarness};
use crate::mocks::anthropic::AnthropicTestData;
use crate::mocks::openai::OpenAITestData;

#[tokio::test]
async fn test_every_catalog_pair_resolves() {
    let harness = TestHarness::new().await;

    for (vendor, models) in catalog() {
        for model in models {
            let adapter =
                registry::resolve(vendor.as_str(), model, ModelParams::default(), &harness.clients)
                    .unwrap();
            assert_eq!(adapter.vendor(), vendor);
            assert_eq!(adapter.model(), *model);
        }
    }
}

#[tokio::test]
async fn test_unknown_pairs_fail_with_configuration_error() {
    let harness = TestHarness::new().await;

    let cases = [
        ("cohere", "command-r"),
        ("openai", "claude-3-opus-20240229"),
        ("anthropic", "gpt-4o"),
        ("openai", ""),
    ];
    for (vendor, model) in cases {
        let result = registry::resolve(vendor, model, ModelParams::default(), &harness.clients);
        assert!(
            matches!(result, Err(ColloquyError::Configuration(_))),
            "{}/{} should not resolve",
            vendor,
            model
        );
    }
}

#[tokio::test]
async fn test_resolved_adapters_hit_their_own_vendor() {
    let harness = TestHarness::new().await;
    harness
        .openai
        .mock_completion(OpenAITestData::completion("from openai", Some("stop")))
        .await;
    harness
        .anthropic
        .mock_message(AnthropicTestData::message("from anthropic", Some("end_turn")))
        .await;

    let openai = registry::resolve("openai", "gpt-4o", ModelParams::default(), &harness.clients)
        .unwrap();
    let anthropic = registry::resolve(
        "anthropic",
        "claude-3-5-sonnet-20240620",
        ModelParams::default(),
        &harness.clients,
    )
    .unwrap();

    let conversation = basic_conversation();
    assert_eq!(openai.complete(&conversation).await.unwrap().text, "from openai");
    assert_eq!(
        anthropic.complete(&conversation).await.unwrap().text,
        "from anthropic"
    );

    assert_eq!(harness.openai.received_requests().await.len(), 1);
    assert_eq!(harness.anthropic.received_requests().await.len(), 1);
}

#[test]
fn test_flat_catalog_listing() {
    let models = flat_vendor_models();
    assert_eq!(
        models,
        vec![
            "openai/gpt-4o",
            "openai/gpt-4o-mini",
            "openai/gpt-4-vision-preview",
            "anthropic/claude-3-5-sonnet-20240620",
            "anthropic/claude-3-opus-20240229",
            "anthropic/claude-3-haiku-20240307",
        ]
    );
}

#[test]
fn test_invalid_params_rejected_at_resolution() {
    let clients = colloquy::VendorClients::for_testing("http://127.0.0.1:1", "http://127.0.0.1:1");
    let params = ModelParams::default().with_temperature(3.5);

    let result = registry::resolve("openai", "gpt-4o", params, &clients);
    assert!(matches!(
        result,
        Err(ColloquyError::Configuration(ConfigurationError::InvalidParameter { .. }))
    ));
    assert_eq!("anthropic".parse::<Vendor>().unwrap(), Vendor::Anthropic);
}
