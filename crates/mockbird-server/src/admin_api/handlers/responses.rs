//! Response definition CRUD handlers.

use crate::admin_api::handlers::repository_error_response;
use crate::admin_api::types::*;
use crate::repository::{MockRepository, ResponseDefinition};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{error, info};

/// GET /response - list all response definitions
pub fn handle_list(repository: &MockRepository) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &repository.get_responses())
}

/// GET /response/:id - get a single response definition
pub fn handle_get(repository: &MockRepository, id: u32) -> Response<Full<Bytes>> {
    match repository.get_response_by_id(id) {
        Ok(def) => json_response(StatusCode::OK, &def),
        Err(e) => repository_error_response(e),
    }
}

/// PUT /response - add a new response definition
pub async fn handle_create(
    req: Request<Incoming>,
    repository: &MockRepository,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let input: ResponseDefinition = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid response JSON: {e}"))
        }
    };
    match repository.add_response(&input) {
        Ok(created) => {
            info!("Created response definition #{}", created.id);
            json_response(StatusCode::OK, &created)
        }
        Err(e) => {
            error!("Unable to create response definition: {}", e);
            repository_error_response(e)
        }
    }
}

/// PATCH /response/:id - update an existing response definition field by field
pub async fn handle_patch(
    id: u32,
    req: Request<Incoming>,
    repository: &MockRepository,
) -> Response<Full<Bytes>> {
    let body = match collect_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };
    let input: ResponseDefinition = match serde_json::from_slice(&body) {
        Ok(i) => i,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid response JSON: {e}"))
        }
    };
    if input.id == 0 {
        return error_response(
            StatusCode::CONFLICT,
            "The response definition has an empty id.",
        );
    }
    if input.id != id {
        return error_response(StatusCode::NOT_ACCEPTABLE, "Ids mismatch.");
    }
    if !repository.response_exists_for_id(id) {
        return error_response(
            StatusCode::NOT_FOUND,
            &format!("No response definition found with id #{id}."),
        );
    }

    // Body before MIME type: an emptied body clears the stored MIME type, and
    // only then may a new one be applied.
    if let Err(e) = repository.set_response_status_code(id, input.status_code) {
        return repository_error_response(e);
    }
    if let Err(e) = repository.set_response_body(id, &input.body) {
        return repository_error_response(e);
    }
    if let Err(e) = repository.set_response_mime_type(id, &input.mime_type) {
        return repository_error_response(e);
    }

    match repository.get_response_by_id(id) {
        Ok(updated) => {
            info!("Updated response definition #{}", id);
            json_response(StatusCode::OK, &updated)
        }
        Err(e) => repository_error_response(e),
    }
}

/// DELETE /response/:id - remove a response definition
pub fn handle_delete(repository: &MockRepository, id: u32) -> Response<Full<Bytes>> {
    if id == 0 {
        return error_response(StatusCode::BAD_REQUEST, "The id is 0.");
    }
    if !repository.response_exists_for_id(id) {
        return error_response(
            StatusCode::NOT_FOUND,
            &format!("No response with id #{id} found."),
        );
    }
    match repository.remove_response(id) {
        Ok(()) => {
            info!("Removed response definition #{}", id);
            build_response(StatusCode::OK, "")
        }
        Err(e) => repository_error_response(e),
    }
}
