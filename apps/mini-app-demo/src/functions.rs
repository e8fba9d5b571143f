//! Functions this mini-app exposes at `POST /<functionName>`.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

pub const GET_USER: &str = "getUser";
pub const GET_SETTINGS: &str = "getSettings";

/// Names declared at registration; must match the routes below.
pub const EXPOSED: [&str; 2] = [GET_USER, GET_SETTINGS];

pub fn router() -> Router {
    Router::new()
        .route(&format!("/{GET_USER}"), post(get_user))
        .route(&format!("/{GET_SETTINGS}"), post(get_settings))
}

/// `{"userId": <number>}` -> the user's profile. Fractional ids are
/// truncated toward zero.
#[tracing::instrument(skip_all)]
async fn get_user(body: Bytes) -> (StatusCode, Json<Value>) {
    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return bad_request("Invalid JSON format");
    };
    let Some(user_id) = payload.get("userId").and_then(whole_user_id) else {
        return bad_request("Missing or invalid userId");
    };

    tracing::info!(user_id, "getUser");
    (
        StatusCode::OK,
        Json(json!({
            "id": user_id,
            "name": "John Doe",
            "email": "john@example.com",
        })),
    )
}

/// 2^63, the first float past `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn whole_user_id(raw: &Value) -> Option<i64> {
    if let Some(id) = raw.as_i64() {
        return Some(id);
    }
    let truncated = raw.as_f64()?.trunc();
    if !(-I64_LIMIT..I64_LIMIT).contains(&truncated) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)] // integral and in range
    let id = truncated as i64;
    Some(id)
}

async fn get_settings() -> Json<Value> {
    Json(json!({"theme": "dark", "notifications": true}))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}
