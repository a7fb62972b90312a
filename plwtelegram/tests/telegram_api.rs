//! Integration tests for the Telegram Bot API client

use plwmonitor::Notifier;
use plwtelegram::{Error, TelegramClient, TelegramNotifier};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> TelegramClient {
    TelegramClient::builder("123:abc")
        .api_base(server.uri())
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_get_me_parses_bot_identity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/getMe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"id": 42, "is_bot": true, "username": "playlist_watch_bot"}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let me = client.get_me().await.unwrap();

    assert_eq!(me.id, 42);
    assert_eq!(me.username.as_deref(), Some("playlist_watch_bot"));
}

#[tokio::test]
async fn test_send_message_posts_chat_and_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "987",
            "text": "hello"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    client.send_message("987", "hello").await.unwrap();
}

#[tokio::test]
async fn test_api_rejection_surfaces_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.send_message("987", "hello").await.unwrap_err();

    match err {
        Error::Api(description) => assert!(description.contains("chat not found")),
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_updates_parses_messages_and_offset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/getUpdates"))
        .and(body_partial_json(json!({"offset": 7})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                {
                    "update_id": 7,
                    "message": {
                        "message_id": 1,
                        "chat": {"id": 987, "type": "private"},
                        "text": "/check"
                    }
                },
                {"update_id": 8}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let updates = client
        .get_updates(Some(7), Duration::from_secs(0))
        .await
        .unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 7);
    let message = updates[0].message.as_ref().unwrap();
    assert_eq!(message.chat.id, 987);
    assert_eq!(message.text.as_deref(), Some("/check"));
    // Updates without a message (edits, joins) are tolerated.
    assert!(updates[1].message.is_none());
}

#[tokio::test]
async fn test_notifier_delivers_to_configured_chat() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({"chat_id": "987"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let notifier = TelegramNotifier::new(client, "987");
    notifier.send("new track!").await.unwrap();
}

#[tokio::test]
async fn test_notifier_maps_failures_to_delivery_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let notifier = TelegramNotifier::new(client, "987");
    assert!(notifier.send("new track!").await.is_err());
}
