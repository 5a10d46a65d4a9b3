//! One-shot import of a legacy mock directory tree.
//!
//! The legacy layout encodes definitions in the filesystem: each first-level
//! directory is a route, an optional `response.json` holds the payload, a
//! `<code>.statuscode` file name carries the status, and sub-directories are
//! URL-encoded query strings. The importer only drives the repository's
//! public operations; nothing here touches the store directly.

use crate::repository::{MockRepository, RequestInput, ResponseDefinition};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome counters for an import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Import every mock directory under `root`.
pub fn import_directory(
    repository: &MockRepository,
    root: &Path,
) -> Result<ImportSummary, anyhow::Error> {
    let mut summary = ImportSummary::default();
    info!("Importing legacy definitions from {:?}", root);
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.eq_ignore_ascii_case("src") {
            continue;
        }
        process_route_directory(repository, &entry.path(), &name, &mut summary)?;
    }
    info!(
        "Legacy import finished: {} imported, {} skipped",
        summary.imported, summary.skipped
    );
    Ok(summary)
}

fn process_route_directory(
    repository: &MockRepository,
    dir: &Path,
    route: &str,
    summary: &mut ImportSummary,
) -> Result<(), anyhow::Error> {
    debug!("Processing directory '{}'", route);
    if let Some((status_code, body)) = read_definition(dir)? {
        create_definition(repository, route, "", status_code, &body, summary)?;
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let encoded = entry.file_name().to_string_lossy().to_string();
        let query = urlencoding::decode(&encoded)
            .map(|q| q.into_owned())
            .unwrap_or(encoded);
        if let Some((status_code, body)) = read_definition(&entry.path())? {
            create_definition(repository, route, &query, status_code, &body, summary)?;
        }
    }
    Ok(())
}

/// Read the (status, body) a legacy directory defines, if any.
///
/// `response.json` supplies the body; the first parsable `<code>.statuscode`
/// file name supplies the status (default 200). A directory with neither
/// defines nothing.
fn read_definition(dir: &Path) -> Result<Option<(u16, String)>, anyhow::Error> {
    let response_file = dir.join("response.json");
    let body = if response_file.is_file() {
        Some(fs::read_to_string(&response_file)?)
    } else {
        None
    };

    let mut status_code = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("statuscode") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match stem.parse::<u16>() {
            Ok(code) => status_code = Some(code),
            Err(_) => warn!("Ignoring unparsable status code file {:?}", path),
        }
    }

    if body.is_none() && status_code.is_none() {
        return Ok(None);
    }
    Ok(Some((status_code.unwrap_or(200), body.unwrap_or_default())))
}

fn create_definition(
    repository: &MockRepository,
    route: &str,
    query: &str,
    status_code: u16,
    body: &str,
    summary: &mut ImportSummary,
) -> Result<(), anyhow::Error> {
    let mime_type = if body.is_empty() { "" } else { "application/json" };
    if repository.request_exists("GET", route, query, "")? {
        warn!(
            "A request for route '{}' [GET] already exists, skipping import",
            route
        );
        summary.skipped += 1;
        return Ok(());
    }
    let response_id = if repository.response_exists(status_code, body, mime_type) {
        repository.get_response(status_code, body, mime_type)?.id
    } else {
        repository
            .add_response(&ResponseDefinition {
                id: 0,
                status_code,
                body: body.to_string(),
                mime_type: mime_type.to_string(),
            })?
            .id
    };
    repository.add_request(&RequestInput {
        id: 0,
        route: route.to_string(),
        method: "GET".to_string(),
        query: query.to_string(),
        body: String::new(),
        response_id,
    })?;
    summary.imported += 1;
    Ok(())
}
