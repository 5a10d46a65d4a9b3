//! Definition repository: matching, uniqueness and CRUD over the store.
//!
//! This module provides:
//! - `MockRepository`: the engine every other component talks to
//! - `RequestDefinition` / `ResponseDefinition`: the stored records
//! - `RepositoryError`: one variant per failure kind
//!
//! All operations run to completion under a single lock acquisition, so the
//! check-then-act sequences (uniqueness checks before an insert or update)
//! cannot interleave with other mutations.

mod types;

#[cfg(test)]
mod tests;

pub use types::{
    HttpMethod, RepositoryError, RequestDefinition, RequestInput, ResponseDefinition,
};

use crate::store::{DefinitionStore, StoreError};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Strip the leading slash a caller may have put on a route.
fn normalize_route(route: &str) -> &str {
    route.strip_prefix('/').unwrap_or(route)
}

/// Find the response matching (statusCode, body, mimeType).
///
/// Staged filters with early exit: status, then body, then MIME type. An empty
/// `body` argument matches only stored responses without content, and the MIME
/// type is not compared at all in that case. Non-empty comparisons are
/// case-insensitive; a stored empty MIME type is an ordinary matchable value.
fn find_response<'a>(
    responses: &'a [ResponseDefinition],
    status_code: u16,
    body: &str,
    mime_type: &str,
) -> Option<&'a ResponseDefinition> {
    let candidates: Vec<&ResponseDefinition> = responses
        .iter()
        .filter(|r| r.status_code == status_code)
        .collect();
    if candidates.is_empty() {
        debug!("No response found (no status code match)");
        return None;
    }
    if body.is_empty() {
        let found = candidates.into_iter().find(|r| r.body.is_empty());
        if found.is_none() {
            debug!("No response found (no empty-body match)");
        }
        return found;
    }
    let candidates: Vec<&ResponseDefinition> = candidates
        .into_iter()
        .filter(|r| r.body.eq_ignore_ascii_case(body))
        .collect();
    if candidates.is_empty() {
        debug!("No response found (no body match)");
        return None;
    }
    let found = candidates.into_iter().find(|r| {
        if mime_type.is_empty() {
            r.mime_type.is_empty()
        } else {
            r.mime_type.eq_ignore_ascii_case(mime_type)
        }
    });
    if found.is_none() {
        debug!("No response found (no MIME type match)");
    }
    found
}

/// Find the request matching (method, route, query, body).
///
/// Staged filters with early exit: method, route, query, body. Route, query
/// and body compare case-insensitively; empty query/body arguments match only
/// stored records whose query/body are empty. `route` must already be
/// normalized.
fn find_request<'a>(
    requests: &'a [RequestDefinition],
    method: HttpMethod,
    route: &str,
    query: &str,
    body: &str,
) -> Option<&'a RequestDefinition> {
    let candidates: Vec<&RequestDefinition> =
        requests.iter().filter(|r| r.method == method).collect();
    if candidates.is_empty() {
        debug!("No request found (no method match)");
        return None;
    }
    let candidates: Vec<&RequestDefinition> = candidates
        .into_iter()
        .filter(|r| r.route.eq_ignore_ascii_case(route))
        .collect();
    if candidates.is_empty() {
        debug!("No request found (no route match)");
        return None;
    }
    let candidates: Vec<&RequestDefinition> = candidates
        .into_iter()
        .filter(|r| {
            if query.is_empty() {
                r.query.is_empty()
            } else {
                r.query.eq_ignore_ascii_case(query)
            }
        })
        .collect();
    if candidates.is_empty() {
        debug!("No request found (no query match)");
        return None;
    }
    let found = candidates.into_iter().find(|r| {
        if body.is_empty() {
            r.body.is_empty()
        } else {
            r.body.eq_ignore_ascii_case(body)
        }
    });
    if found.is_none() {
        debug!("No request found (no body match)");
    }
    found
}

/// Repository over the definition store.
///
/// Constructed once at process start and shared by handle; read-only
/// operations take a read guard and may run concurrently, mutations take the
/// write guard and serialize.
pub struct MockRepository {
    store: RwLock<DefinitionStore>,
}

impl MockRepository {
    pub fn new(store: DefinitionStore) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Delete the store's backing file. Missing file counts as success.
    pub fn delete_data_file(&self) -> Result<(), StoreError> {
        self.store.read().delete_data_file()
    }

    // ========================================================================
    // Responses
    // ========================================================================

    pub fn response_exists_for_id(&self, id: u32) -> bool {
        self.store.read().responses().iter().any(|r| r.id == id)
    }

    /// Check whether a response with the given values exists.
    ///
    /// An empty `body` matches only stored responses without content, and
    /// skips the MIME type comparison entirely.
    pub fn response_exists(&self, status_code: u16, body: &str, mime_type: &str) -> bool {
        let store = self.store.read();
        find_response(store.responses(), status_code, body, mime_type).is_some()
    }

    pub fn get_response_by_id(&self, id: u32) -> Result<ResponseDefinition, RepositoryError> {
        self.store
            .read()
            .responses()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::ResponseNotFound(id))
    }

    /// Get the response with the given values (matching rule as
    /// [`MockRepository::response_exists`]).
    pub fn get_response(
        &self,
        status_code: u16,
        body: &str,
        mime_type: &str,
    ) -> Result<ResponseDefinition, RepositoryError> {
        let store = self.store.read();
        find_response(store.responses(), status_code, body, mime_type)
            .cloned()
            .ok_or(RepositoryError::NoMatchingResponse(status_code))
    }

    pub fn get_responses(&self) -> Vec<ResponseDefinition> {
        self.store.read().responses().to_vec()
    }

    /// Add a new response. Its id must be 0 and its values must not collide
    /// with an existing definition.
    pub fn add_response(
        &self,
        def: &ResponseDefinition,
    ) -> Result<ResponseDefinition, RepositoryError> {
        let mut store = self.store.write();
        if def.id != 0 {
            return Err(RepositoryError::ResponseIdNotZero);
        }
        if find_response(store.responses(), def.status_code, &def.body, &def.mime_type).is_some() {
            return Err(RepositoryError::ResponseAlreadyExists);
        }
        let created =
            store.insert_response(def.status_code, def.body.clone(), def.mime_type.clone());
        store.persist()?;
        info!(
            "Created response (HTTP {}) with id #{}",
            created.status_code, created.id
        );
        Ok(created)
    }

    pub fn set_response_status_code(
        &self,
        id: u32,
        status_code: u16,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .response_mut(id)
            .ok_or(RepositoryError::ResponseNotFound(id))?;
        if existing.status_code == status_code {
            return Ok(());
        }
        existing.status_code = status_code;
        store.persist()?;
        Ok(())
    }

    /// Set the response payload. Clearing the payload also clears the MIME
    /// type, since a response without content carries no content type.
    pub fn set_response_body(&self, id: u32, body: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .response_mut(id)
            .ok_or(RepositoryError::ResponseNotFound(id))?;
        if existing.body.eq_ignore_ascii_case(body) {
            return Ok(());
        }
        existing.body = body.to_string();
        if body.is_empty() {
            existing.mime_type.clear();
        }
        store.persist()?;
        Ok(())
    }

    pub fn set_response_mime_type(&self, id: u32, mime_type: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .response_mut(id)
            .ok_or(RepositoryError::ResponseNotFound(id))?;
        if existing.mime_type.eq_ignore_ascii_case(mime_type) {
            return Ok(());
        }
        existing.mime_type = mime_type.to_string();
        store.persist()?;
        Ok(())
    }

    /// Remove a response unconditionally. Callers are responsible for not
    /// leaving requests dangling; [`MockRepository::remove_request`] handles
    /// the cascading case.
    pub fn remove_response(&self, id: u32) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        if !store.remove_response(id) {
            return Err(RepositoryError::ResponseNotFound(id));
        }
        store.persist()?;
        Ok(())
    }

    // ========================================================================
    // Requests
    // ========================================================================

    pub fn request_exists_for_id(&self, id: u32) -> bool {
        self.store.read().requests().iter().any(|r| r.id == id)
    }

    /// Check whether a request with the given values exists.
    ///
    /// Fails with [`RepositoryError::UnknownMethod`] for an unsupported
    /// method string. The route's leading slash is stripped before comparison.
    pub fn request_exists(
        &self,
        method: &str,
        route: &str,
        query: &str,
        body: &str,
    ) -> Result<bool, RepositoryError> {
        let method = HttpMethod::parse(method)?;
        let route = normalize_route(route);
        let store = self.store.read();
        Ok(find_request(store.requests(), method, route, query, body).is_some())
    }

    pub fn get_request_by_id(&self, id: u32) -> Result<RequestDefinition, RepositoryError> {
        self.store
            .read()
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))
    }

    /// Get the request with the given values (matching rule as
    /// [`MockRepository::request_exists`]).
    pub fn get_request(
        &self,
        method: &str,
        route: &str,
        query: &str,
        body: &str,
    ) -> Result<RequestDefinition, RepositoryError> {
        let method = HttpMethod::parse(method)?;
        let route = normalize_route(route);
        let store = self.store.read();
        find_request(store.requests(), method, route, query, body)
            .cloned()
            .ok_or(RepositoryError::NoMatchingRequest)
    }

    pub fn get_requests(&self) -> Vec<RequestDefinition> {
        self.store.read().requests().to_vec()
    }

    /// Add a new request definition.
    ///
    /// Validation order: method, response id set, response exists, id is 0,
    /// tuple not already registered.
    pub fn add_request(&self, input: &RequestInput) -> Result<RequestDefinition, RepositoryError> {
        let mut store = self.store.write();
        let method = HttpMethod::parse(&input.method)?;
        if input.response_id == 0 {
            return Err(RepositoryError::MissingResponse);
        }
        if !store.responses().iter().any(|r| r.id == input.response_id) {
            return Err(RepositoryError::UnknownResponse(input.response_id));
        }
        if input.id != 0 {
            return Err(RepositoryError::RequestIdNotZero);
        }
        let route = normalize_route(&input.route);
        if find_request(store.requests(), method, route, &input.query, &input.body).is_some() {
            return Err(RepositoryError::RequestAlreadyExists);
        }
        let created = store.insert_request(
            route.to_string(),
            method,
            input.query.clone(),
            input.body.clone(),
            input.response_id,
        );
        store.persist()?;
        info!(
            "Created request #{} ({}) [{}]",
            created.id, created.route, created.method
        );
        Ok(created)
    }

    /// Remove a request. When it is the only request referencing its
    /// response, the response is deleted along with it.
    pub fn remove_request(&self, id: u32) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))?;
        let response_use_count = store
            .requests()
            .iter()
            .filter(|r| r.response_id == existing.response_id)
            .count();
        if response_use_count == 1 {
            store.remove_response(existing.response_id);
            debug!(
                "Removed response #{} together with its last request",
                existing.response_id
            );
        }
        store.remove_request(id);
        store.persist()?;
        Ok(())
    }

    pub fn set_request_route(&self, id: u32, route: &str) -> Result<(), RepositoryError> {
        let route = normalize_route(route);
        let mut store = self.store.write();
        let existing = store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))?;
        if existing.route.eq_ignore_ascii_case(route) {
            return Ok(());
        }
        if find_request(
            store.requests(),
            existing.method,
            route,
            &existing.query,
            &existing.body,
        )
        .is_some()
        {
            return Err(RepositoryError::RequestAlreadyExists);
        }
        if let Some(item) = store.request_mut(id) {
            item.route = route.to_string();
        }
        store.persist()?;
        Ok(())
    }

    pub fn set_request_query(&self, id: u32, query: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))?;
        if existing.query.eq_ignore_ascii_case(query) {
            return Ok(());
        }
        if find_request(
            store.requests(),
            existing.method,
            &existing.route,
            query,
            &existing.body,
        )
        .is_some()
        {
            return Err(RepositoryError::RequestAlreadyExists);
        }
        if let Some(item) = store.request_mut(id) {
            item.query = query.to_string();
        }
        store.persist()?;
        Ok(())
    }

    pub fn set_request_body(&self, id: u32, body: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))?;
        if existing.body.eq_ignore_ascii_case(body) {
            return Ok(());
        }
        if find_request(
            store.requests(),
            existing.method,
            &existing.route,
            &existing.query,
            body,
        )
        .is_some()
        {
            return Err(RepositoryError::RequestAlreadyExists);
        }
        if let Some(item) = store.request_mut(id) {
            item.body = body.to_string();
        }
        store.persist()?;
        Ok(())
    }

    pub fn set_request_method(&self, id: u32, method: &str) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let existing = store
            .requests()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(RepositoryError::RequestNotFound(id))?;
        let method = HttpMethod::parse(method)?;
        if existing.method == method {
            return Ok(());
        }
        if find_request(
            store.requests(),
            method,
            &existing.route,
            &existing.query,
            &existing.body,
        )
        .is_some()
        {
            return Err(RepositoryError::RequestAlreadyExists);
        }
        if let Some(item) = store.request_mut(id) {
            item.method = method;
        }
        store.persist()?;
        Ok(())
    }

    pub fn set_request_response_id(&self, id: u32, response_id: u32) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        if !store.requests().iter().any(|r| r.id == id) {
            return Err(RepositoryError::RequestNotFound(id));
        }
        if !store.responses().iter().any(|r| r.id == response_id) {
            return Err(RepositoryError::UnknownResponse(response_id));
        }
        let Some(item) = store.request_mut(id) else {
            return Err(RepositoryError::RequestNotFound(id));
        };
        if item.response_id == response_id {
            return Ok(());
        }
        item.response_id = response_id;
        store.persist()?;
        Ok(())
    }

    /// Set the method of every request whose route matches (case-insensitive).
    pub fn set_method_for_route(&self, route: &str, method: &str) -> Result<(), RepositoryError> {
        let method = HttpMethod::parse(method)?;
        let route = normalize_route(route);
        let mut store = self.store.write();
        let mut changed = 0usize;
        for request in store.requests_mut() {
            if !request.route.eq_ignore_ascii_case(route) {
                continue;
            }
            request.method = method;
            changed += 1;
        }
        if changed > 0 {
            store.persist()?;
            info!("Set method {} on {} request(s) for route '{}'", method, changed, route);
        }
        Ok(())
    }
}
