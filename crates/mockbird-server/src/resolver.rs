//! Mock resolver: maps an incoming request shape to a canned reply.
//!
//! State-free per request. The resolver owns the mock path prefix and the
//! auto-generation policy; everything else is delegated to the repository.

use crate::repository::{MockRepository, RepositoryError, RequestInput, ResponseDefinition};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Everything needed to emit the outgoing HTTP response.
///
/// An empty `content_type` means no Content-Type header is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReply {
    pub status_code: u16,
    pub content: String,
    pub content_type: String,
}

impl MockReply {
    fn status_only(status_code: u16) -> Self {
        Self {
            status_code,
            content: String::new(),
            content_type: String::new(),
        }
    }

    fn text(status_code: u16, content: &str) -> Self {
        Self {
            status_code,
            content: content.to_string(),
            content_type: String::new(),
        }
    }
}

/// Resolves intercepted traffic against the stored definitions.
pub struct MockResolver {
    repository: Arc<MockRepository>,
    /// Path prefix marking mock traffic, without slashes (e.g. "mockup").
    prefix: String,
    /// Synthesize a 200-empty definition pair for unknown requests instead of
    /// rejecting them with 501.
    auto_generate: bool,
}

impl MockResolver {
    pub fn new(repository: Arc<MockRepository>, prefix: &str, auto_generate: bool) -> Self {
        Self {
            repository,
            prefix: prefix.trim_matches('/').to_string(),
            auto_generate,
        }
    }

    /// Whether `path` is mock traffic (starts with the configured prefix).
    pub fn handles(&self, path: &str) -> bool {
        let stripped = path.strip_prefix('/').unwrap_or(path);
        stripped
            .get(..self.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&self.prefix))
    }

    /// Strip the prefix from `path` and normalize the remainder to a route.
    fn route_for(&self, path: &str) -> String {
        let stripped = path.strip_prefix('/').unwrap_or(path);
        let rest = stripped.get(self.prefix.len()..).unwrap_or("");
        let rest = if rest.is_empty() { "/" } else { rest };
        rest.strip_prefix('/').unwrap_or(rest).to_string()
    }

    /// Resolve an intercepted request to the reply that should be written.
    ///
    /// Never fails: policy violations and internal faults are expressed as
    /// replies (501 for unknown shapes, 500 for unusable definitions).
    pub fn resolve(&self, method: &str, path: &str, query: &str, body: &str) -> MockReply {
        let route = self.route_for(path);
        let query = query.strip_prefix('?').unwrap_or(query);

        let exists = match self.repository.request_exists(method, &route, query, body) {
            Ok(exists) => exists,
            Err(RepositoryError::UnknownMethod(m)) => {
                // Nothing outside the supported set can ever be defined.
                debug!("No mock possible for method '{}'", m);
                return MockReply::text(501, "Not implemented");
            }
            Err(e) => {
                error!("Request lookup failed: {}", e);
                return MockReply::text(500, &e.to_string());
            }
        };

        if !exists {
            if !self.auto_generate {
                debug!("No request '{}' [{}] exists", route, method);
                return MockReply::text(501, "Not implemented");
            }
            if let Err(e) = self.generate_definition(method, &route, query, body) {
                error!("Auto-generation for '{}' [{}] failed: {}", route, method, e);
                return MockReply::text(500, &e.to_string());
            }
        }

        let request = match self.repository.get_request(method, &route, query, body) {
            Ok(request) => request,
            Err(e) => {
                error!("Unable to find request [{}] for '{}': {}", method, route, e);
                return MockReply::text(500, &e.to_string());
            }
        };
        let response = match self.repository.get_response_by_id(request.response_id) {
            Ok(response) => response,
            Err(e) => {
                error!("Unable to find response for id #{}: {}", request.response_id, e);
                return MockReply::text(500, &e.to_string());
            }
        };

        if response.body.is_empty() {
            return MockReply::status_only(response.status_code);
        }
        if response.mime_type.is_empty() {
            warn!("Response #{} has content but no MIME type", response.id);
            return MockReply::text(500, "MIME type for response not set.");
        }
        MockReply {
            status_code: response.status_code,
            content: response.body.clone(),
            content_type: response.mime_type.clone(),
        }
    }

    /// Create a 200-empty response (reusing an existing one) and a request
    /// definition pointing at it.
    fn generate_definition(
        &self,
        method: &str,
        route: &str,
        query: &str,
        body: &str,
    ) -> Result<(), RepositoryError> {
        if !self.repository.response_exists(200, "", "") {
            let result = self.repository.add_response(&ResponseDefinition {
                id: 0,
                status_code: 200,
                body: String::new(),
                mime_type: String::new(),
            });
            match result {
                Ok(_) | Err(RepositoryError::ResponseAlreadyExists) => {}
                Err(e) => return Err(e),
            }
        }
        let response = self.repository.get_response(200, "", "")?;
        let result = self.repository.add_request(&RequestInput {
            id: 0,
            route: route.to_string(),
            method: method.to_string(),
            query: query.to_string(),
            body: body.to_string(),
            response_id: response.id,
        });
        match result {
            Ok(created) => {
                debug!(
                    "Auto-generated request #{} ('{}') [{}]",
                    created.id, created.route, created.method
                );
                Ok(())
            }
            // A concurrent resolve may have created the same definition
            // between our lookup and this insert.
            Err(RepositoryError::RequestAlreadyExists) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
