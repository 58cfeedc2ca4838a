mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedCompletion, state_with};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use speakease_backend::message::Message;
use speakease_backend::prompts::conversation_instruction;
use speakease_backend::routes::create_router;
use speakease_backend::state::AppState;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve the app on an ephemeral port and return the websocket URL.
async fn spawn_server(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let app = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> WsClient {
    let (stream, _) = connect_async(url)
        .await
        .expect("Failed to connect to WebSocket");
    stream
}

async fn send(client: &mut WsClient, frame: Value) {
    client
        .send(WsMessage::Text(frame.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame, parsed as JSON. Control frames are skipped.
async fn receive(client: &mut WsClient) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timeout waiting for message")
            .expect("Stream ended")
            .expect("WebSocket error");
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Failed to parse frame");
            }
            WsMessage::Ping(_) | WsMessage::Pong(_) => continue,
            other => panic!("Expected text frame, got: {other:?}"),
        }
    }
}

async fn wait_for_sessions(state: &AppState, expected: usize) {
    for _ in 0..100 {
        if state.sessions.len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {expected} live sessions");
}

#[tokio::test]
async fn test_topic_and_request_round_trip() {
    let client = ScriptedCompletion::replying("What do you like to paint?");
    let state = state_with(client.clone());
    let url = spawn_server(state.clone()).await;

    let mut ws = connect(&url).await;
    send(&mut ws, json!({"event": "topic", "data": "talk about hobbies"})).await;
    send(
        &mut ws,
        json!({"event": "request", "data": [{"role": "user", "content": "I like painting"}]}),
    )
    .await;

    let frame = receive(&mut ws).await;
    assert_eq!(frame, json!({"event": "reply", "data": "What do you like to paint?"}));

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, conversation_instruction("talk about hobbies"));
    assert_eq!(calls[0].history, vec![Message::user("I like painting")]);
}

#[tokio::test]
async fn test_upstream_failure_sends_null_reply() {
    let state = state_with(ScriptedCompletion::failing());
    let url = spawn_server(state).await;

    let mut ws = connect(&url).await;
    send(
        &mut ws,
        json!({"event": "request", "data": [{"role": "user", "content": "hello"}]}),
    )
    .await;

    let frame = receive(&mut ws).await;
    assert_eq!(frame["event"], "reply");
    assert!(frame["data"].is_null());
}

#[tokio::test]
async fn test_malformed_request_still_gets_one_reply() {
    let client = ScriptedCompletion::replying("unused");
    let state = state_with(client.clone());
    let url = spawn_server(state).await;

    let mut ws = connect(&url).await;
    send(&mut ws, json!({"event": "request", "data": "not a history"})).await;
    send(&mut ws, json!({"event": "mystery", "data": 1})).await;

    let frame = receive(&mut ws).await;
    assert_eq!(frame, json!({"event": "reply", "data": null}));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_connections_keep_separate_topics() {
    let client = ScriptedCompletion::with(|call| Ok(call.system_prompt.clone()));
    let state = state_with(client);
    let url = spawn_server(state).await;

    let mut a = connect(&url).await;
    let mut b = connect(&url).await;
    send(&mut a, json!({"event": "topic", "data": "ordering food"})).await;
    send(&mut b, json!({"event": "topic", "data": "asking directions"})).await;

    let request = json!({"event": "request", "data": [{"role": "user", "content": "hi"}]});
    send(&mut b, request.clone()).await;
    send(&mut a, request).await;

    let seen_by_a = receive(&mut a).await["data"].as_str().unwrap().to_string();
    let seen_by_b = receive(&mut b).await["data"].as_str().unwrap().to_string();
    assert_eq!(seen_by_a, conversation_instruction("ordering food"));
    assert_eq!(seen_by_b, conversation_instruction("asking directions"));
}

#[tokio::test]
async fn test_two_quick_requests_both_answered() {
    let client = ScriptedCompletion::with_delay(
        |call| Ok(call.history[0].content.to_uppercase()),
        |call| {
            if call.history[0].content == "slow" {
                Duration::from_millis(150)
            } else {
                Duration::ZERO
            }
        },
    );
    let state = state_with(client);
    let url = spawn_server(state).await;

    let mut ws = connect(&url).await;
    send(&mut ws, json!({"event": "request", "data": [{"role": "user", "content": "slow"}]})).await;
    send(&mut ws, json!({"event": "request", "data": [{"role": "user", "content": "fast"}]})).await;

    let mut replies = vec![
        receive(&mut ws).await["data"].as_str().unwrap().to_string(),
        receive(&mut ws).await["data"].as_str().unwrap().to_string(),
    ];
    replies.sort();
    assert_eq!(replies, vec!["FAST".to_string(), "SLOW".to_string()]);
}

#[tokio::test]
async fn test_disconnect_discards_session() {
    let client = ScriptedCompletion::with(|call| Ok(call.system_prompt.clone()));
    let state = state_with(client);
    let url = spawn_server(state.clone()).await;

    let mut ws = connect(&url).await;
    send(&mut ws, json!({"event": "topic", "data": "music"})).await;
    wait_for_sessions(&state, 1).await;

    ws.close(None).await.expect("Failed to close");
    wait_for_sessions(&state, 0).await;

    // A fresh connection starts from the default context.
    let mut again = connect(&url).await;
    send(&mut again, json!({"event": "request", "data": [{"role": "user", "content": "hi"}]})).await;
    let reply = receive(&mut again).await;
    assert_eq!(reply["data"], json!(conversation_instruction("")));
    again.close(None).await.expect("Failed to close");
}
