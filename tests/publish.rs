//! Publish scenarios against the in-memory service.

use std::sync::Arc;

use pubprobe::{Failure, Harness, HarnessConfig, NoPacing, assert_passed};
use pubprobe_testing::MemoryClient;
use rstest::{fixture, rstest};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct CustomComplexMessage {
    version_id: f32,
    time_token: i64,
    operation_name: String,
    channels: Vec<String>,
    demo_message: Option<String>,
}

fn complex_message() -> CustomComplexMessage {
    CustomComplexMessage {
        version_id: 3.4,
        time_token: 13_601_488_652_764_619,
        operation_name: "Publish".to_owned(),
        channels: vec!["ch1".to_owned(), "ch 2".to_owned()],
        demo_message: Some("this is a demo message".to_owned()),
    }
}

fn harness(client: MemoryClient, config: HarnessConfig) -> Harness<MemoryClient> {
    Harness::new(Arc::new(client), config)
        .expect("valid config")
        .with_pacer(NoPacing)
}

#[fixture]
fn plain() -> Harness<MemoryClient> { harness(MemoryClient::new(), HarnessConfig::default()) }

#[rstest]
#[case("NullMessage")]
#[tokio::test]
async fn null_message_is_rejected(plain: Harness<MemoryClient>, #[case] name: &str) {
    let verdict = plain.null_message_rejected(name).await;
    assert_passed(&verdict);
    assert!(plain.client().stored("testChannel").is_empty());
}

#[rstest]
#[tokio::test]
async fn plain_message_is_acknowledged(plain: Harness<MemoryClient>) {
    let verdict = plain
        .publish_acknowledged("SuccessCodeAndInfo", json!("Pubnub API Usage Example"))
        .await;
    assert_passed(&verdict);
    assert_eq!(verdict.to_string(), "Test 'SuccessCodeAndInfo': passed.");
}

#[tokio::test]
async fn encrypted_message_is_stored_as_ciphertext() {
    let harness = harness(
        MemoryClient::new().with_cipher_key("enigma"),
        HarnessConfig::default().with_cipher_key("enigma"),
    );
    let verdict = harness
        .publish_acknowledged("SuccessCodeAndInfoWithEncryption", json!("Pubnub API Usage Example"))
        .await;
    assert_passed(&verdict);

    let stored = harness.client().stored("testChannel");
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].body.to_string().contains("Pubnub API Usage Example"));
}

#[rstest]
#[tokio::test]
async fn complex_message_is_acknowledged(plain: Harness<MemoryClient>) {
    let message = serde_json::to_value(complex_message()).expect("serializable message");
    let verdict = plain
        .publish_acknowledged("SuccessCodeAndInfoForComplexMessage", message)
        .await;
    assert_passed(&verdict);
}

#[rstest]
#[tokio::test]
async fn oversized_message_is_rejected(plain: Harness<MemoryClient>) {
    let message = "This is a large message test which will return an error message. ".repeat(32);
    let verdict = plain.oversized_message_rejected("MessageTooLarge", message).await;
    assert_passed(&verdict);
}

#[rstest]
#[tokio::test]
async fn accepted_message_fails_a_rejection_scenario(plain: Harness<MemoryClient>) {
    let verdict = plain.oversized_message_rejected("MessageTooLarge", "short").await;
    assert!(matches!(verdict.failure(), Some(Failure::ContentMismatch { .. })));
}

#[tokio::test]
async fn wrong_rejection_status_fails() {
    let harness = harness(
        MemoryClient::new().with_max_message_bytes(4),
        HarnessConfig::default(),
    );
    let verdict = harness
        .publish_rejected("NullMessage", json!("longer than four"), "Invalid Message")
        .await;
    assert_eq!(
        verdict.failure(),
        Some(&Failure::ContentMismatch {
            expected: "Invalid Message".to_owned(),
            actual: "Message Too Large".to_owned(),
        })
    );
}

#[rstest]
#[tokio::test]
async fn unexpected_rejection_is_relayed_verbatim(plain: Harness<MemoryClient>) {
    let verdict = plain
        .publish_acknowledged("SuccessCodeAndInfo", serde_json::Value::Null)
        .await;
    let Some(Failure::ServiceError(text)) = verdict.failure() else {
        panic!("expected service error, got {verdict}");
    };
    assert!(text.contains("Invalid Message"));
}
