//! Route dispatch for the admin API and mock traffic interception.
//!
//! Anything under the configured mock prefix is answered by the resolver;
//! everything else is matched against the admin routes.

use crate::admin_api::handlers::{requests, responses, system, tools};
use crate::admin_api::types::{
    build_response, build_response_with_headers, collect_body, error_response, not_found,
};
use crate::admin_api::AdminState;
use crate::resolver::MockReply;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Main request router
pub async fn route_request(
    req: Request<Incoming>,
    state: Arc<AdminState>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|s| s.to_string());

    debug!("{} {}", method, path);

    // Mock traffic is intercepted before any admin route can match.
    if state.resolver.handles(&path) {
        return Ok(handle_mock(req, &state).await);
    }

    Ok(route_by_path(&method, &path, query.as_deref(), req, &state).await)
}

/// Answer an intercepted request from the stored definitions.
async fn handle_mock(req: Request<Incoming>, state: &AdminState) -> Response<Full<Bytes>> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or("").to_string();
    let body = match collect_body(req).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let txn = Uuid::new_v4();
    let span = tracing::debug_span!("mock", %txn);
    let _guard = span.enter();
    let reply = state.resolver.resolve(&method, &path, &query, &body);
    debug!(
        "Answering {} {} with HTTP {}",
        method, path, reply.status_code
    );
    mock_response(reply)
}

/// Turn a resolver reply into the outgoing HTTP response.
fn mock_response(reply: MockReply) -> Response<Full<Bytes>> {
    // Stored status codes are not range-validated; anything the HTTP layer
    // cannot express degrades to a 500.
    let status =
        StatusCode::from_u16(reply.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if reply.content_type.is_empty() {
        build_response(status, reply.content)
    } else {
        build_response_with_headers(
            status,
            [("Content-Type", reply.content_type.as_str())],
            reply.content,
        )
    }
}

/// Route based on path
async fn route_by_path(
    method: &Method,
    path: &str,
    query: Option<&str>,
    req: Request<Incoming>,
    state: &AdminState,
) -> Response<Full<Bytes>> {
    let repository = &state.repository;

    // Fast path for fixed routes
    match (method, path) {
        (&Method::GET, "/") => return system::handle_root(),
        (&Method::GET, "/health") => return system::handle_health(),
        (&Method::GET, "/tools/import") => return tools::handle_import(repository, query),
        (&Method::DELETE, "/tools/delete") => return tools::handle_delete_data(repository),
        _ => {}
    }

    // Request definition collection and entity routes
    if path == "/request" {
        return match *method {
            Method::GET => requests::handle_list(repository),
            Method::PUT => requests::handle_create(req, repository).await,
            _ => not_found(),
        };
    }
    if let Some(rest) = path.strip_prefix("/request/") {
        let id: u32 = match rest.parse() {
            Ok(id) => id,
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid id"),
        };
        return match *method {
            Method::GET => requests::handle_get(repository, id),
            Method::PATCH => requests::handle_patch(id, req, repository).await,
            Method::DELETE => requests::handle_delete(repository, id),
            _ => not_found(),
        };
    }

    // Response definition collection and entity routes
    if path == "/response" {
        return match *method {
            Method::GET => responses::handle_list(repository),
            Method::PUT => responses::handle_create(req, repository).await,
            _ => not_found(),
        };
    }
    if let Some(rest) = path.strip_prefix("/response/") {
        let id: u32 = match rest.parse() {
            Ok(id) => id,
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid id"),
        };
        return match *method {
            Method::GET => responses::handle_get(repository, id),
            Method::PATCH => responses::handle_patch(id, req, repository).await,
            Method::DELETE => responses::handle_delete(repository, id),
            _ => not_found(),
        };
    }

    not_found()
}
