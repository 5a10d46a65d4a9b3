//! Admin API request handlers.

pub mod requests;
pub mod responses;
pub mod system;
pub mod tools;

use crate::admin_api::types::error_response;
use crate::repository::RepositoryError;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

/// Map a repository failure to the admin API status code.
///
/// Not-found kinds map to 404, uniqueness violations to 400, and validation
/// failures (non-zero id on create, unknown method, missing/unknown response
/// reference) to 409. Storage faults surface as 500 with the message.
pub(crate) fn repository_error_response(err: RepositoryError) -> Response<Full<Bytes>> {
    use RepositoryError::*;
    let status = match err {
        ResponseNotFound(_) | NoMatchingResponse(_) | RequestNotFound(_) | NoMatchingRequest => {
            StatusCode::NOT_FOUND
        }
        ResponseAlreadyExists | RequestAlreadyExists => StatusCode::BAD_REQUEST,
        ResponseIdNotZero | RequestIdNotZero | UnknownMethod(_) | MissingResponse
        | UnknownResponse(_) => StatusCode::CONFLICT,
        Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}
