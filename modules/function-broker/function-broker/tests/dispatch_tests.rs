#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end dispatch over real loopback sockets.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use function_broker::CallRequest;
use function_broker::domain::error::DomainError;
use serde_json::{Value, json};

use common::{accept_and_drop, accept_and_hang, broker_with_b, closed_port, mini_app_b, spawn_app};

#[tokio::test]
async fn round_trip_against_stub_mini_app() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_app(mini_app_b(hits.clone())).await;
    let broker = broker_with_b(&[&base], 2_000);

    let request = CallRequest::new("a", "b", "getUser", Some(json!({"userId": 123})));
    let body = broker.service().call(&request).await.unwrap();

    assert_eq!(
        body,
        json!({"id": 123, "name": "John Doe", "email": "john.doe@example.com"})
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failover_attempts_a_dead_candidate_at_most_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let live = spawn_app(mini_app_b(hits.clone())).await;
    let (dropping, accepted) = accept_and_drop().await;
    let broker = broker_with_b(&[&closed_port(), &dropping, &live], 2_000);

    let request = CallRequest::<Value>::new("a", "b", "getSettings", None);
    let body = broker.service().call(&request).await.unwrap();

    assert_eq!(body, json!({"theme": "dark", "notifications": true}));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn all_candidates_failing_is_bounded_by_timeout_times_count() {
    let first = accept_and_hang().await;
    let second = accept_and_hang().await;
    let broker = broker_with_b(&[&first, &second], 300);

    let started = Instant::now();
    let request = CallRequest::<Value>::new("a", "b", "getUser", None);
    let err = broker.service().call(&request).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(err, DomainError::UpstreamUnreachable { attempts: 2, .. }),
        "unexpected: {err:?}"
    );
    assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_600), "{elapsed:?}");
}

#[tokio::test]
async fn unreachable_detail_carries_the_last_error() {
    let broker = broker_with_b(&[&closed_port()], 1_000);

    let request = CallRequest::<Value>::new("a", "b", "getUser", None);
    match broker.service().call(&request).await.unwrap_err() {
        DomainError::UpstreamUnreachable {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 1);
            assert!(!last_error.is_empty());
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_with_json_body_is_relayed() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_app(mini_app_b(hits)).await;
    let broker = broker_with_b(&[&base], 2_000);

    let request = CallRequest::<Value>::new("a", "b", "reject", None);
    let body = broker.service().call(&request).await.unwrap();
    assert_eq!(body, json!({"error": "Missing or invalid userId"}));
}

#[tokio::test]
async fn malformed_body_is_not_retried_elsewhere() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));
    let first = spawn_app(mini_app_b(first_hits.clone())).await;
    let second = spawn_app(mini_app_b(second_hits.clone())).await;
    let broker = broker_with_b(&[&first, &second], 2_000);

    let request = CallRequest::<Value>::new("a", "b", "html", None);
    let err = broker.service().call(&request).await.unwrap_err();

    assert!(matches!(err, DomainError::MalformedUpstreamResponse { .. }));
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn json_array_body_is_malformed_and_not_retried() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));
    let first = spawn_app(mini_app_b(first_hits.clone())).await;
    let second = spawn_app(mini_app_b(second_hits.clone())).await;
    let broker = broker_with_b(&[&first, &second], 2_000);

    let request = CallRequest::<Value>::new("a", "b", "list", None);
    let err = broker.service().call(&request).await.unwrap_err();

    match err {
        DomainError::MalformedUpstreamResponse { url, source } => {
            assert_eq!(url, format!("{first}/list"));
            assert!(source.to_string().contains("an array"), "{source}");
        }
        other => panic!("expected MalformedUpstreamResponse, got {other:?}"),
    }
    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn payloads_pass_through_unchanged() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_app(mini_app_b(hits)).await;
    let broker = broker_with_b(&[&base], 2_000);

    let nested = json!({
        "user": {"id": 7, "tags": ["a", "b"], "meta": {"deep": [1, 2.5, null, true]}},
        "empty": {},
    });
    let request = CallRequest::new("a", "b", "echo", Some(nested.clone()));
    assert_eq!(broker.service().call(&request).await.unwrap(), nested);

    let request = CallRequest::<Value>::new("a", "b", "echo", None);
    assert_eq!(broker.service().call(&request).await.unwrap(), Value::Null);
}

#[tokio::test]
async fn unencodable_payload_fails_before_any_network_attempt() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_app(mini_app_b(hits.clone())).await;
    let broker = broker_with_b(&[&base], 2_000);

    let payload: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
    let request = CallRequest::new("a", "b", "echo", Some(payload));
    let err = broker.service().call(&request).await.unwrap_err();

    assert!(matches!(err, DomainError::PayloadEncoding(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn per_call_url_is_tried_before_registered_addresses() {
    let override_hits = Arc::new(AtomicUsize::new(0));
    let registered_hits = Arc::new(AtomicUsize::new(0));
    let override_base = spawn_app(mini_app_b(override_hits.clone())).await;
    let registered = spawn_app(mini_app_b(registered_hits.clone())).await;
    let broker = broker_with_b(&[&registered], 2_000);

    let request =
        CallRequest::<Value>::new("a", "b", "getSettings", None).with_url(override_base);
    broker.service().call(&request).await.unwrap();

    assert_eq!(override_hits.load(Ordering::SeqCst), 1);
    assert_eq!(registered_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn duplicate_override_of_a_dead_address_is_tried_once() {
    let (dropping, accepted) = accept_and_drop().await;
    let broker = broker_with_b(&[&dropping], 1_000);

    let request =
        CallRequest::<Value>::new("a", "b", "getUser", None).with_url(format!("{dropping}/"));
    let err = broker.service().call(&request).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::UpstreamUnreachable { attempts: 1, .. }
    ));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
