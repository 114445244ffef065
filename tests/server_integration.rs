use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use chat_widget::AppState;
use chat_widget::bot::{EchoReplier, GreetingReplier, ReplyContext, ReplyEngine, ReplyError};
use chat_widget::config::AppConfig;
use chat_widget::protocol::{ErrorResponse, HistoryResponse, SendMessageResponse};
use chat_widget::server::router;
use serde_json::json;

#[derive(Debug)]
struct FailingEngine;

#[async_trait]
impl ReplyEngine for FailingEngine {
    async fn reply(&self, _message: &str, _context: &ReplyContext) -> Result<String, ReplyError> {
        Err(ReplyError::Malformed("upstream went away".to_string()))
    }
}

fn config() -> Arc<AppConfig> {
    Arc::new(AppConfig::load_from_args(["chat-widget"]).expect("default config"))
}

fn greeting_engine() -> Arc<dyn ReplyEngine> {
    Arc::new(GreetingReplier::new(
        "Welcome!".to_string(),
        "Welcome back!".to_string(),
        Arc::new(EchoReplier),
    ))
}

fn test_server(engine: Arc<dyn ReplyEngine>) -> (TestServer, AppState) {
    let state = AppState::with_engine(config(), engine);
    let server = TestServer::new(router(state.clone())).expect("test server");
    (server, state)
}

#[tokio::test]
async fn index_page_carries_the_element_contract() {
    let (server, _) = test_server(greeting_engine());

    let response = server.get("/").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains(r#"id="chatbox""#));
    assert!(html.contains(r#"id="message""#));
    assert!(html.contains(r#"id="userInput""#));
    assert!(html.contains(r#"data-endpoint="/send_message""#));
    assert!(html.contains(r#"data-load-history="false""#));
    assert!(html.contains("/static/chat-widget.js"));
}

#[tokio::test]
async fn widget_script_is_served() {
    let (server, _) = test_server(greeting_engine());

    let response = server.get("/static/chat-widget.js").await;
    response.assert_status_ok();
    assert!(response.text().contains("/send_message"));
}

#[tokio::test]
async fn widget_script_checks_history_before_clearing_the_panel() {
    let (server, _) = test_server(greeting_engine());

    let script = server.get("/static/chat-widget.js").await.text();
    let loader = &script[script.find("async function loadHistory").expect("history loader")..];
    let check = loader.find("Array.isArray(data.history)").expect("history shape check");
    let clear = loader.find("chatbox.innerHTML = ''").expect("panel reset");
    assert!(check < clear);
}

#[tokio::test]
async fn message_is_answered_and_recorded() {
    let (server, state) = test_server(greeting_engine());

    let response = server
        .post("/send_message")
        .json(&json!({ "message": "  what is <b>this</b>?  " }))
        .await;
    response.assert_status_ok();

    let body: SendMessageResponse = response.json();
    assert_eq!(body.reply, "You said: what is &lt;b&gt;this&lt;/b&gt;?");

    let lines = state.history.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Bot: "));
    assert_eq!(lines[1], "User: what is <b>this</b>?");
    assert_eq!(lines[2], "Bot: You said: what is &lt;b&gt;this&lt;/b&gt;?");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (server, state) = test_server(greeting_engine());

    let response = server
        .post("/send_message")
        .json(&json!({ "message": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "Empty message");
    assert_eq!(state.history.user_turns(), 0);
}

#[tokio::test]
async fn body_without_message_is_rejected() {
    let (server, _) = test_server(greeting_engine());

    let response = server
        .post("/send_message")
        .json(&json!({ "text": "hello" }))
        .await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn greetings_depend_on_the_turn() {
    let (server, _) = test_server(greeting_engine());

    let first: SendMessageResponse = server
        .post("/send_message")
        .json(&json!({ "message": "Hola!" }))
        .await
        .json();
    assert_eq!(first.reply, "Welcome!");

    let second: SendMessageResponse = server
        .post("/send_message")
        .json(&json!({ "message": "hi" }))
        .await
        .json();
    assert_eq!(second.reply, "Welcome back!");
}

#[tokio::test]
async fn engine_failure_is_a_bad_gateway() {
    let (server, state) = test_server(Arc::new(FailingEngine));

    let response = server
        .post("/send_message")
        .json(&json!({ "message": "hello" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: serde_json::Value = response.json();
    assert!(body.get("reply").is_none());
    assert_eq!(body["error"], "The assistant could not answer");

    // The user line is kept; no bot line is recorded.
    assert_eq!(state.history.lines().last().unwrap(), "User: hello");
}

#[tokio::test]
async fn history_starts_with_the_greeting() {
    let (server, state) = test_server(greeting_engine());

    let history: HistoryResponse = server.get("/get_history").await.json();
    assert_eq!(
        history.history,
        [format!("Bot: {}", state.config.bot.greeting)]
    );

    server
        .post("/send_message")
        .json(&json!({ "message": "ping" }))
        .await
        .assert_status_ok();

    let history: HistoryResponse = server.get("/get_history").await.json();
    assert_eq!(history.history.len(), 3);
    assert_eq!(history.history[1], "User: ping");
}
