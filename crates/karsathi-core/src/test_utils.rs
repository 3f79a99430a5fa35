//! Test utilities for karsathi-core
//!
//! This module provides testing infrastructure including a mock provider
//! server that speaks both the OpenAI chat-completions and the Gemini
//! generateContent wire formats, so the real backends can be exercised
//! without network access.

use axum::extract::{Json, Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock provider server for testing
pub struct MockProviderServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockProviderServer {
    /// Key the mock accepts
    pub const VALID_KEY: &'static str = "mock-valid-key";
    /// Key the mock rejects with a quota error
    pub const QUOTA_KEY: &'static str = "mock-quota-key";

    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/v1beta/models/:model", post(handle_generate_content));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// OpenAI-shaped chat completions endpoint.
///
/// Echoes the last user message so tests can assert verbatim pass-through.
async fn handle_chat_completions(
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    let bearer = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    if bearer == MockProviderServer::QUOTA_KEY {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": {
                    "message": "You exceeded your current quota",
                    "type": "insufficient_quota",
                    "code": "insufficient_quota"
                }
            })),
        );
    }
    if bearer != MockProviderServer::VALID_KEY {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })),
        );
    }

    let user_message = request["messages"]
        .as_array()
        .and_then(|messages| {
            messages
                .iter()
                .rev()
                .find(|m| m["role"] == "user")
                .and_then(|m| m["content"].as_str())
        })
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": request["model"],
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": format!("echo: {}", user_message)
                },
                "finish_reason": "stop"
            }]
        })),
    )
}

/// Gemini-shaped generateContent endpoint.
///
/// The path segment arrives as "gemini-1.5-flash:generateContent"; the key
/// comes in the query string.
async fn handle_generate_content(
    Path(_model): Path<String>,
    RawQuery(query): RawQuery,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    let key = query
        .unwrap_or_default()
        .split('&')
        .find_map(|pair| pair.strip_prefix("key=").map(str::to_string))
        .unwrap_or_default();

    if key != MockProviderServer::VALID_KEY {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{"reason": "API_KEY_INVALID"}]
                }
            })),
        );
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": format!("gemini echo: {}", prompt)}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        })),
    )
}
