use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};

use assistant_module::{AssistantClient, AssistantConfig};
use relay_module::adapters::line::{LineInboundAdapter, LineOutboundAdapter};
use relay_module::channel::InboundAdapter;
use relay_module::relay::RelayService;

fn relay_against(server: &ServerGuard) -> RelayService {
    let mut config = AssistantConfig::new("sk-test", "asst_test");
    config.api_base = server.url();
    config.poll_interval = Duration::from_millis(0);
    let assistant = AssistantClient::new(config);
    let outbound = LineOutboundAdapter::with_api_base("line-test-token".to_string(), server.url());
    RelayService::new(assistant, outbound)
}

const WEBHOOK_DELIVERY: &str = r#"{
    "destination": "U_bot",
    "events": [
        {
            "type": "message",
            "replyToken": "rtok-1",
            "source": {"type": "user", "userId": "U_alice"},
            "message": {"id": "m1", "type": "text", "text": "ping"}
        }
    ]
}"#;

#[tokio::test]
async fn relays_assistant_reply_to_the_platform() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/threads")
        .with_status(200)
        .with_body(r#"{"id":"thread_abc"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/threads/thread_abc/messages")
        .match_body(Matcher::Regex("\"content\":\"ping\"".to_string()))
        .with_status(200)
        .with_body(r#"{"id":"msg_1"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/threads/thread_abc/runs")
        .with_status(200)
        .with_body(r#"{"id":"run_1","status":"queued"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/threads/thread_abc/runs/run_1")
        .with_status(200)
        .with_body(r#"{"id":"run_1","status":"completed"}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/threads/thread_abc/messages")
        .with_status(200)
        .with_body(
            r#"{"data": [{"role": "assistant", "content": [{"type": "text", "text": {"value": "pong"}}]}]}"#,
        )
        .create_async()
        .await;

    let reply_mock = server
        .mock("POST", "/v2/bot/message/reply")
        .match_header("authorization", "Bearer line-test-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("\"replyToken\":\"rtok-1\"".to_string()),
            Matcher::Regex("\"text\":\"pong\"".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sentMessages":[{"id":"msg-out-1"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let relay = relay_against(&server);
    let adapter = LineInboundAdapter::new();
    let messages = adapter.parse(WEBHOOK_DELIVERY.as_bytes()).unwrap();
    assert_eq!(messages.len(), 1);

    relay.handle_message(&messages[0]).await;

    reply_mock.assert_async().await;
}

#[tokio::test]
async fn failed_retrieval_dispatches_fallback_text() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/threads")
        .with_status(500)
        .with_body(r#"{"error":{"message":"server exploded"}}"#)
        .expect(1)
        .create_async()
        .await;

    let reply_mock = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("\"replyToken\":\"rtok-1\"".to_string()),
            Matcher::Regex("could not start a conversation".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"sentMessages":[{"id":"msg-out-1"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let relay = relay_against(&server);
    let adapter = LineInboundAdapter::new();
    let messages = adapter.parse(WEBHOOK_DELIVERY.as_bytes()).unwrap();

    relay.handle_message(&messages[0]).await;

    reply_mock.assert_async().await;
}

#[tokio::test]
async fn rejected_dispatch_is_swallowed() {
    let mut server = Server::new_async().await;

    server
        .mock("POST", "/threads")
        .with_status(200)
        .with_body(r#"{"id":"thread_abc"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/threads/thread_abc/messages")
        .with_status(200)
        .with_body(r#"{"id":"msg_1"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/threads/thread_abc/runs")
        .with_status(200)
        .with_body(r#"{"id":"run_1","status":"queued"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/threads/thread_abc/runs/run_1")
        .with_status(200)
        .with_body(r#"{"id":"run_1","status":"completed"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/threads/thread_abc/messages")
        .with_status(200)
        .with_body(r#"{"messages": [{"content": "pong"}]}"#)
        .create_async()
        .await;

    let reply_mock = server
        .mock("POST", "/v2/bot/message/reply")
        .with_status(400)
        .with_body(r#"{"message":"Invalid reply token"}"#)
        .expect(1)
        .create_async()
        .await;

    let relay = relay_against(&server);
    let adapter = LineInboundAdapter::new();
    let messages = adapter.parse(WEBHOOK_DELIVERY.as_bytes()).unwrap();

    // The dispatcher is best-effort; a rejected reply must not panic or error.
    relay.handle_message(&messages[0]).await;

    reply_mock.assert_async().await;
}
