//! Type definitions for mock request/response definitions.
//!
//! This module contains the stored definition records, the wire-side input
//! type for request creation, and the repository error enum.

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// HTTP Method
// ============================================================================

/// The HTTP methods a request definition can be registered for.
///
/// Anything outside this set is rejected with [`RepositoryError::UnknownMethod`]
/// before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Parse a method string (case-insensitive).
    pub fn parse(value: &str) -> Result<Self, RepositoryError> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(RepositoryError::UnknownMethod(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Definition Records
// ============================================================================

/// A canned HTTP response: status code plus optional payload and MIME type.
///
/// `id` is assigned by the store on creation (1-based, monotonically
/// increasing) and must be 0 on input. An empty `body` means "no content";
/// an empty `mime_type` means "no content type".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default)]
    pub id: u32,
    pub status_code: u16,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub mime_type: String,
}

/// A stored rule matching incoming calls by method, route, query and body.
///
/// `route` is stored without a leading slash. Empty `query`/`body` only match
/// incoming requests whose query/body are also empty. `response_id` references
/// the [`ResponseDefinition`] served for a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDefinition {
    #[serde(default)]
    pub id: u32,
    pub route: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub body: String,
    pub response_id: u32,
}

/// Wire-side input for creating or patching a request definition.
///
/// The method is a free string here so that an unsupported value surfaces as
/// [`RepositoryError::UnknownMethod`] instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    #[serde(default)]
    pub id: u32,
    pub route: String,
    pub method: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub response_id: u32,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by the definition repository.
///
/// Each (operation, cause) pair maps to exactly one variant so callers can
/// branch on the kind without string matching.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no response with id #{0} exists")]
    ResponseNotFound(u32),
    #[error("no response for HTTP status {0} with the given content exists")]
    NoMatchingResponse(u16),
    #[error("the id for a new response must be 0")]
    ResponseIdNotZero,
    #[error("the response already exists")]
    ResponseAlreadyExists,
    #[error("no request with id #{0} exists")]
    RequestNotFound(u32),
    #[error("no request with the given values exists")]
    NoMatchingRequest,
    #[error("the id for a new request must be 0")]
    RequestIdNotZero,
    #[error("a request with the given values already exists")]
    RequestAlreadyExists,
    #[error("unknown HTTP method '{0}'")]
    UnknownMethod(String),
    #[error("no response set for the new request")]
    MissingResponse,
    #[error("no response with id #{0} found for the request")]
    UnknownResponse(u32),
    #[error(transparent)]
    Storage(#[from] StoreError),
}
