//! Maintenance handlers: legacy import and data file removal.

use crate::admin_api::types::*;
use crate::legacy;
use crate::repository::MockRepository;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::path::Path;
use tracing::error;

/// GET /tools/import?path=<dir> - import a legacy mock directory tree
pub fn handle_import(repository: &MockRepository, query: Option<&str>) -> Response<Full<Bytes>> {
    let Some(path) = query_param(query, "path") else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'path' query parameter.");
    };
    let dir = Path::new(&path);
    if !dir.is_dir() {
        return not_found();
    }
    match legacy::import_directory(repository, dir) {
        Ok(summary) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "path": path,
                "imported": summary.imported,
                "skipped": summary.skipped,
            }),
        ),
        Err(e) => {
            error!("Legacy import from '{}' failed: {}", path, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// DELETE /tools/delete - delete the data file (idempotent when absent)
pub fn handle_delete_data(repository: &MockRepository) -> Response<Full<Bytes>> {
    match repository.delete_data_file() {
        Ok(()) => build_response(StatusCode::OK, ""),
        Err(e) => {
            error!("Unable to delete the data file: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Unable to delete the database: {e}"),
            )
        }
    }
}

/// Extract a query parameter value, URL-decoded.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    for pair in query.split('&') {
        let mut parts = pair.splitn(2, '=');
        if parts.next() != Some(name) {
            continue;
        }
        let value = parts.next().unwrap_or("");
        return Some(
            urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string()),
        );
    }
    None
}
