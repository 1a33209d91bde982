//! Behaviour of the scripted client itself.

use pubprobe::{Delivery, HistoryQuery, PubSubClient, RawResponse, Request};
use pubprobe_testing::{ScriptedClient, Step};
use serde_json::json;

#[tokio::test]
async fn exhausted_queue_closes_without_data() {
    let client = ScriptedClient::new();
    assert_eq!(client.time().settle().await, None);
}

#[tokio::test]
async fn scripts_are_consumed_in_order() {
    let client = ScriptedClient::with_scripts([
        vec![Step::success("[1]")],
        vec![Step::KeepAlive, Step::failure("[0,\"boom\",\"0\"]")],
    ]);

    assert_eq!(
        client.time().settle().await,
        Some(Delivery::Success(RawResponse::from("[1]")))
    );
    assert_eq!(
        client.history(&HistoryQuery::new("c", 1)).settle().await,
        Some(Delivery::Failure(RawResponse::from("[0,\"boom\",\"0\"]")))
    );
}

#[tokio::test]
async fn requests_are_recorded() {
    let client = ScriptedClient::new();
    drop(client.publish("c", json!("hello")));
    drop(client.time());

    assert_eq!(
        client.requests(),
        [Request::publish("c", "hello"), Request::Time]
    );
}
