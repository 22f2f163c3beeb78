use super::*;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use counsel::{ReplySource, answer};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/legal-advice")
}

fn responder_for(chat_url: String, timeout_secs: Option<u64>) -> ReqwestResponder {
    let config = ClientConfig { chat_url, chat_timeout_secs: timeout_secs, ..ClientConfig::default() };
    ReqwestResponder::new(&config).unwrap()
}

// =============================================================================
// REMOTE ANSWERS
// =============================================================================

#[tokio::test]
async fn success_returns_response_field() {
    let app = Router::new().route(
        "/api/legal-advice",
        post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
            let echoed = body["message"].as_str().unwrap_or_default().to_owned();
            axum::Json(serde_json::json!({ "response": format!("You asked: {echoed}") }))
        }),
    );
    let responder = responder_for(serve(app).await, None);

    let reply = answer(&responder, "What is bail?").await;
    assert_eq!(reply.source, ReplySource::Remote);
    assert_eq!(reply.text, "You asked: What is bail?");
}

#[tokio::test]
async fn empty_response_uses_apology_text() {
    let app = Router::new()
        .route("/api/legal-advice", post(|| async { axum::Json(serde_json::json!({ "response": "" })) }));
    let responder = responder_for(serve(app).await, None);

    let reply = answer(&responder, "hello").await;
    assert_eq!(reply.source, ReplySource::Remote);
    assert_eq!(reply.text, counsel::dispatch::EMPTY_RESPONSE_TEXT);
}

// =============================================================================
// FALLBACK
// =============================================================================

#[tokio::test]
async fn server_error_maps_to_status() {
    let app = Router::new().route("/api/legal-advice", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let responder = responder_for(serve(app).await, None);

    assert_eq!(responder.respond("theft").await, Err(ChatError::Status(500)));
}

#[tokio::test]
async fn server_error_falls_back_to_local_answer() {
    let app = Router::new().route("/api/legal-advice", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let responder = responder_for(serve(app).await, None);

    let reply = answer(&responder, "Someone committed theft of my phone").await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert!(reply.text.contains("Section 378"));
}

#[tokio::test]
async fn malformed_body_falls_back() {
    let app = Router::new().route("/api/legal-advice", post(|| async { "definitely not json" }));
    let responder = responder_for(serve(app).await, None);

    assert!(matches!(responder.respond("x").await, Err(ChatError::Decode(_))));
    let reply = answer(&responder, "I had an accident on the highway").await;
    assert_eq!(reply.source, ReplySource::Fallback);
    assert!(reply.text.contains("Motor Vehicles Act"));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let responder = responder_for(format!("http://{addr}/api/legal-advice"), None);

    assert!(matches!(responder.respond("x").await, Err(ChatError::Transport(_))));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let app = Router::new().route(
        "/api/legal-advice",
        post(|| async {
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
            axum::Json(serde_json::json!({ "response": "late" }))
        }),
    );
    let responder = responder_for(serve(app).await, Some(1));

    assert_eq!(responder.respond("x").await, Err(ChatError::Timeout(1)));
}
