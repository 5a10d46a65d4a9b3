//! Admin REST API and mock traffic interception.
//!
//! This module provides:
//! - CRUD endpoints for request and response definitions
//! - Maintenance endpoints (legacy import, data file removal)
//! - Interception of everything under the mock path prefix, answered by the
//!   resolver
//!
//! The API listens on a configurable address (default: 0.0.0.0:5000).

mod handlers;
mod router;
mod server;
mod types;

pub use server::{AdminApiServer, AdminState};
