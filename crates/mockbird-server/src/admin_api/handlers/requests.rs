//! Request definition CRUD handlers.

use crate::admin_api::handlers::repository_error_response;
use crate::admin_api::types::*;
use crate::repository::{MockRepository, RequestInput};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{error, info};

/// GET /request - list all request definitions
pub fn handle_list(repository: &MockRepository) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &repository.get_requests())
}

/// GET /request/:id - get a single request definition
pub fn handle_get(repository: &MockRepository, id: u32) -> Response<Full<Bytes>> {
    match repository.get_request_by_id(id) {
        Ok(def) => json_response(StatusCode::OK, &def),
        Err(e) => repository_error_response(e),
    }
}

/// PUT /request - add a new request definition
pub async fn handle_create(
    req: Request<Incoming>,
    repository: &MockRepository,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let input: RequestInput = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid request JSON: {e}"))
        }
    };
    match repository.add_request(&input) {
        Ok(created) => {
            info!("Created request definition #{}", created.id);
            json_response(StatusCode::OK, &created)
        }
        Err(e) => {
            error!("Unable to create request definition: {}", e);
            repository_error_response(e)
        }
    }
}

/// PATCH /request/:id - update an existing request definition field by field
pub async fn handle_patch(
    id: u32,
    req: Request<Incoming>,
    repository: &MockRepository,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let input: RequestInput = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid request JSON: {e}"))
        }
    };
    if input.id == 0 {
        return error_response(
            StatusCode::CONFLICT,
            "The request definition has an empty id.",
        );
    }
    if input.id != id {
        return error_response(StatusCode::NOT_ACCEPTABLE, "Ids mismatch.");
    }
    let existing = match repository.get_request_by_id(id) {
        Ok(def) => def,
        Err(e) => return repository_error_response(e),
    };

    // Each setter is a no-op when the value is unchanged and re-validates the
    // full tuple otherwise.
    if let Err(e) = repository.set_request_method(id, &input.method) {
        return repository_error_response(e);
    }
    if let Err(e) = repository.set_request_route(id, &input.route) {
        return repository_error_response(e);
    }
    if let Err(e) = repository.set_request_query(id, &input.query) {
        return repository_error_response(e);
    }
    if let Err(e) = repository.set_request_body(id, &input.body) {
        return repository_error_response(e);
    }
    if input.response_id != existing.response_id {
        if let Err(e) = repository.set_request_response_id(id, input.response_id) {
            return repository_error_response(e);
        }
    }

    match repository.get_request_by_id(id) {
        Ok(updated) => {
            info!("Updated request definition #{}", id);
            json_response(StatusCode::OK, &updated)
        }
        Err(e) => repository_error_response(e),
    }
}

/// DELETE /request/:id - remove a request definition (and its response, when
/// this was the last request referencing it)
pub fn handle_delete(repository: &MockRepository, id: u32) -> Response<Full<Bytes>> {
    if id == 0 {
        return error_response(StatusCode::BAD_REQUEST, "The id is 0.");
    }
    if !repository.request_exists_for_id(id) {
        return error_response(
            StatusCode::NOT_FOUND,
            &format!("No request with id #{id} found."),
        );
    }
    match repository.remove_request(id) {
        Ok(()) => {
            info!("Removed request definition #{}", id);
            build_response(StatusCode::OK, "")
        }
        Err(e) => repository_error_response(e),
    }
}
