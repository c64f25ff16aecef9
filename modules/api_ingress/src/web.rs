use axum::{
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ErrorResponse;

pub const SERVICE_NAME: &str = "customer-api";

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// Fallback for unmatched routes, so they get a JSON body like every other error.
pub async fn not_found(headers: HeaderMap) -> (StatusCode, Json<ErrorResponse>) {
    let code = StatusCode::NOT_FOUND.as_u16();
    let body = match headers
        .get(crate::request_id::header())
        .and_then(|v| v.to_str().ok())
    {
        Some(rid) => ErrorResponse::with_request_id("Not found", code, rid),
        None => ErrorResponse::new("Not found", code),
    };
    (StatusCode::NOT_FOUND, Json(body))
}
