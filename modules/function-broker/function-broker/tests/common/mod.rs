#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Stub mini-apps and misbehaving listeners shared by the integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::routing::post;
use axum::{Json, Router};
use function_broker::{BrokerConfig, FunctionBroker, Registration};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_app(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A loopback address nobody is listening on.
pub fn closed_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Accepts connections and closes them without answering. Returns the base
/// URL and the number of accepted connections.
pub async fn accept_and_drop() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(socket);
        }
    });
    (format!("http://{addr}"), accepted)
}

/// Accepts connections and never answers.
pub async fn accept_and_hang() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

/// Stub of the demo "mini-app-b". Every request bumps `hits`.
pub fn mini_app_b(hits: Arc<AtomicUsize>) -> Router {
    let user_hits = hits.clone();
    let settings_hits = hits.clone();
    let echo_hits = hits.clone();
    let html_hits = hits.clone();
    let list_hits = hits.clone();
    let reject_hits = hits;

    Router::new()
        .route(
            "/getUser",
            post(move |Json(payload): Json<Value>| async move {
                user_hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "id": payload["userId"],
                    "name": "John Doe",
                    "email": "john.doe@example.com",
                }))
            }),
        )
        .route(
            "/getSettings",
            post(move || async move {
                settings_hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"theme": "dark", "notifications": true}))
            }),
        )
        .route(
            "/echo",
            post(move |body: axum::body::Bytes| async move {
                echo_hits.fetch_add(1, Ordering::SeqCst);
                ([(http::header::CONTENT_TYPE, "application/json")], body)
            }),
        )
        .route(
            "/html",
            post(move || async move {
                html_hits.fetch_add(1, Ordering::SeqCst);
                "<html>not json</html>"
            }),
        )
        .route(
            "/list",
            post(move || async move {
                list_hits.fetch_add(1, Ordering::SeqCst);
                Json(json!(["alice", "bob"]))
            }),
        )
        .route(
            "/reject",
            post(move || async move {
                reject_hits.fetch_add(1, Ordering::SeqCst);
                (
                    http::StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Missing or invalid userId"})),
                )
            }),
        )
}

pub const FUNCTIONS: [&str; 6] = ["getUser", "getSettings", "echo", "html", "list", "reject"];

/// A broker with a short attempt timeout and `b` registered at `addresses`.
pub fn broker_with_b<A: AsRef<str>>(addresses: &[A], attempt_timeout_ms: u64) -> FunctionBroker {
    let config = BrokerConfig {
        attempt_timeout: std::time::Duration::from_millis(attempt_timeout_ms),
        ..BrokerConfig::default()
    };
    let broker = FunctionBroker::new(&config).expect("http client");
    broker
        .service()
        .register(Registration::new("b", FUNCTIONS, addresses.iter().map(AsRef::<str>::as_ref)))
        .unwrap();
    broker
}
