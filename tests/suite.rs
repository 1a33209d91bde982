//! Suite banners, pacing, and verdict log lines.

use std::{sync::Arc, time::Duration};

use pubprobe::{Harness, HarnessConfig, IntervalPacer, Suite, Verdict};
use pubprobe_testing::{LoggerHandle, MemoryClient, logger};
use rstest::rstest;
use serde_json::json;
use serial_test::serial;

fn harness() -> Harness<MemoryClient> {
    Harness::new(Arc::new(MemoryClient::new()), HarnessConfig::default()).expect("valid config")
}

#[rstest]
#[serial(suite_logs)]
#[tokio::test(start_paused = true)]
async fn suite_logs_banners_and_verdicts(mut logger: LoggerHandle) {
    logger.clear();
    let harness = harness();
    let mut suite = Suite::begin(&harness, "Publish");
    suite
        .run(|h| h.publish_acknowledged("SuccessCodeAndInfo", json!("hello")))
        .await;
    suite.run(|h| h.null_message_rejected("NullMessage")).await;
    let report = suite.finish();

    assert_eq!(report.passed(), 2);
    report.assert_all_passed();

    let messages = logger.messages();
    let position = |needle: &str| {
        messages
            .iter()
            .position(|m| m.contains(needle))
            .unwrap_or_else(|| panic!("{needle} not logged: {messages:?}"))
    };
    let start = position("==========Publish tests start==========");
    let first = position("Test 'SuccessCodeAndInfo': passed.");
    let second = position("Test 'NullMessage': passed.");
    let end = position("==========Publish tests end==========");
    assert!(start < first && first < second && second < end);
}

#[rstest]
#[serial(suite_logs)]
#[tokio::test]
async fn failed_verdict_is_logged_with_reason(mut logger: LoggerHandle) {
    logger.clear();
    let harness = harness();
    let verdict = harness
        .publish_rejected("NullMessage", json!("accepted"), "Invalid Message")
        .await;
    assert!(!verdict.is_passed());

    let messages = logger.messages();
    assert!(
        messages
            .iter()
            .any(|m| m.contains("Test 'NullMessage': failed. Returned message mismatch")),
        "failure line not logged: {messages:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn cooldown_separates_scenarios() {
    let harness = harness().with_pacer(IntervalPacer::new(Duration::ZERO, Duration::from_secs(2)));
    let mut suite = Suite::begin(&harness, "Time");
    let started = tokio::time::Instant::now();

    suite.run(|h| h.server_time_check("Time")).await;
    suite.run(|h| h.server_time_check("TimeAgain")).await;

    assert!(started.elapsed() >= Duration::from_secs(4));
    assert_eq!(suite.finish().passed(), 2);
}

#[tokio::test]
async fn windowed_scenarios_record_both_verdicts() {
    let harness = harness().with_pacer(pubprobe::NoPacing);
    let mut suite = Suite::begin(&harness, "DetailedHistory");
    suite
        .run_many(|h| h.time_windowed_history("PublishTimeWindowed"))
        .await;
    let report = suite.finish();

    assert_eq!(
        report.verdicts(),
        [
            Verdict::passed("PublishTimeWindowed"),
            Verdict::passed("PublishTimeWindowed"),
        ]
    );
}
