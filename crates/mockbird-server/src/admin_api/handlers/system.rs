//! System handlers: service info and health.

use crate::admin_api::types::json_response;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// GET / - Root endpoint with service information
pub fn handle_root() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "name": "mockbird",
        "version": env!("CARGO_PKG_VERSION"),
    });
    json_response(StatusCode::OK, &body)
}

/// GET /health - Health check
pub fn handle_health() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({"status": "ok"}))
}
