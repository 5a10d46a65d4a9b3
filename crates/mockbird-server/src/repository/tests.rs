//! Tests for the definition repository.
//!
//! Covers the uniqueness rules, normalization, empty-field matching,
//! cascading deletes and the per-field setters.

use super::*;
use crate::store::DefinitionStore;

fn repository() -> MockRepository {
    MockRepository::new(DefinitionStore::in_memory())
}

fn json_response(repo: &MockRepository) -> ResponseDefinition {
    repo.add_response(&ResponseDefinition {
        id: 0,
        status_code: 200,
        body: r#"{"ok":true}"#.to_string(),
        mime_type: "application/json".to_string(),
    })
    .unwrap()
}

fn get_request_input(route: &str, response_id: u32) -> RequestInput {
    RequestInput {
        id: 0,
        route: route.to_string(),
        method: "GET".to_string(),
        query: String::new(),
        body: String::new(),
        response_id,
    }
}

// ============================================================================
// Responses
// ============================================================================

#[test]
fn test_add_response_assigns_nonzero_id() {
    let repo = repository();
    let created = json_response(&repo);
    assert_ne!(created.id, 0);

    let fetched = repo.get_response_by_id(created.id).unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.status_code, 200);
    assert_eq!(fetched.body, r#"{"ok":true}"#);
    assert_eq!(fetched.mime_type, "application/json");
}

#[test]
fn test_add_response_rejects_nonzero_id() {
    let repo = repository();
    let result = repo.add_response(&ResponseDefinition {
        id: 3,
        status_code: 200,
        body: String::new(),
        mime_type: String::new(),
    });
    assert!(matches!(result, Err(RepositoryError::ResponseIdNotZero)));
}

#[test]
fn test_add_response_twice_fails_with_already_exists() {
    let repo = repository();
    json_response(&repo);
    let result = repo.add_response(&ResponseDefinition {
        id: 0,
        status_code: 200,
        body: r#"{"ok":true}"#.to_string(),
        mime_type: "application/json".to_string(),
    });
    assert!(matches!(result, Err(RepositoryError::ResponseAlreadyExists)));
}

#[test]
fn test_empty_body_matches_regardless_of_mime_type() {
    let repo = repository();
    repo.add_response(&ResponseDefinition {
        id: 0,
        status_code: 204,
        body: String::new(),
        mime_type: String::new(),
    })
    .unwrap();

    assert!(repo.response_exists(204, "", ""));
    assert!(repo.response_exists(204, "", "application/json"));
    assert!(repo.response_exists(204, "", "text/html"));
    assert!(!repo.response_exists(200, "", ""));
}

#[test]
fn test_nonempty_body_requires_body_and_mime_match() {
    let repo = repository();
    json_response(&repo);

    assert!(repo.response_exists(200, r#"{"ok":true}"#, "application/json"));
    // Case-insensitive comparison.
    assert!(repo.response_exists(200, r#"{"OK":TRUE}"#, "APPLICATION/JSON"));
    // Wrong or missing MIME type does not match.
    assert!(!repo.response_exists(200, r#"{"ok":true}"#, "text/plain"));
    assert!(!repo.response_exists(200, r#"{"ok":true}"#, ""));
    // Wrong body does not match.
    assert!(!repo.response_exists(200, "other", "application/json"));
}

#[test]
fn test_stored_empty_mime_type_is_matchable() {
    let repo = repository();
    repo.add_response(&ResponseDefinition {
        id: 0,
        status_code: 200,
        body: "data".to_string(),
        mime_type: String::new(),
    })
    .unwrap();

    assert!(repo.response_exists(200, "data", ""));
    assert!(!repo.response_exists(200, "data", "text/plain"));
    let found = repo.get_response(200, "data", "").unwrap();
    assert_eq!(found.mime_type, "");
}

#[test]
fn test_get_response_fails_without_match() {
    let repo = repository();
    let result = repo.get_response(200, "", "");
    assert!(matches!(result, Err(RepositoryError::NoMatchingResponse(200))));

    let result = repo.get_response_by_id(42);
    assert!(matches!(result, Err(RepositoryError::ResponseNotFound(42))));
}

#[test]
fn test_set_response_body_to_empty_clears_mime_type() {
    let repo = repository();
    let created = json_response(&repo);

    repo.set_response_body(created.id, "").unwrap();
    let updated = repo.get_response_by_id(created.id).unwrap();
    assert_eq!(updated.body, "");
    assert_eq!(updated.mime_type, "");
}

#[test]
fn test_set_response_setters_are_noops_on_same_value() {
    let repo = repository();
    let created = json_response(&repo);

    repo.set_response_status_code(created.id, 200).unwrap();
    repo.set_response_body(created.id, r#"{"OK":TRUE}"#).unwrap();
    repo.set_response_mime_type(created.id, "APPLICATION/JSON")
        .unwrap();

    // Case-insensitive no-ops leave the stored values untouched.
    let unchanged = repo.get_response_by_id(created.id).unwrap();
    assert_eq!(unchanged, created);
}

#[test]
fn test_set_response_fails_for_unknown_id() {
    let repo = repository();
    assert!(matches!(
        repo.set_response_status_code(9, 404),
        Err(RepositoryError::ResponseNotFound(9))
    ));
    assert!(matches!(
        repo.set_response_body(9, "x"),
        Err(RepositoryError::ResponseNotFound(9))
    ));
    assert!(matches!(
        repo.set_response_mime_type(9, "text/plain"),
        Err(RepositoryError::ResponseNotFound(9))
    ));
}

#[test]
fn test_remove_response() {
    let repo = repository();
    let created = json_response(&repo);
    repo.remove_response(created.id).unwrap();
    assert!(!repo.response_exists_for_id(created.id));
    assert!(matches!(
        repo.remove_response(created.id),
        Err(RepositoryError::ResponseNotFound(_))
    ));
}

// ============================================================================
// Requests
// ============================================================================

#[test]
fn test_add_request_round_trip() {
    let repo = repository();
    let response = json_response(&repo);
    let created = repo.add_request(&get_request_input("orders", response.id)).unwrap();

    assert_ne!(created.id, 0);
    assert_eq!(created.method, HttpMethod::Get);
    assert_eq!(created.route, "orders");
    assert_eq!(created.response_id, response.id);
    assert_eq!(repo.get_request_by_id(created.id).unwrap(), created);
}

#[test]
fn test_add_request_strips_leading_slash() {
    let repo = repository();
    let response = json_response(&repo);
    let created = repo
        .add_request(&get_request_input("/orders/open", response.id))
        .unwrap();
    assert_eq!(created.route, "orders/open");

    // The slashed and unslashed spellings are the same route.
    assert!(repo.request_exists("GET", "orders/open", "", "").unwrap());
    assert!(repo.request_exists("GET", "/orders/open", "", "").unwrap());
    let result = repo.add_request(&get_request_input("orders/open", response.id));
    assert!(matches!(result, Err(RepositoryError::RequestAlreadyExists)));
}

#[test]
fn test_add_request_validation_order() {
    let repo = repository();
    let response = json_response(&repo);

    // Unknown method wins over every other failure.
    let mut input = get_request_input("a", 0);
    input.method = "TRACE".to_string();
    assert!(matches!(
        repo.add_request(&input),
        Err(RepositoryError::UnknownMethod(_))
    ));

    // Response id 0.
    assert!(matches!(
        repo.add_request(&get_request_input("a", 0)),
        Err(RepositoryError::MissingResponse)
    ));

    // Response id referencing nothing.
    assert!(matches!(
        repo.add_request(&get_request_input("a", 99)),
        Err(RepositoryError::UnknownResponse(99))
    ));

    // Non-zero record id.
    let mut input = get_request_input("a", response.id);
    input.id = 5;
    assert!(matches!(
        repo.add_request(&input),
        Err(RepositoryError::RequestIdNotZero)
    ));

    // Duplicate tuple.
    repo.add_request(&get_request_input("a", response.id)).unwrap();
    assert!(matches!(
        repo.add_request(&get_request_input("a", response.id)),
        Err(RepositoryError::RequestAlreadyExists)
    ));
}

#[test]
fn test_request_matching_is_case_insensitive() {
    let repo = repository();
    let response = json_response(&repo);
    let mut input = get_request_input("Orders/Open", response.id);
    input.query = "state=NEW".to_string();
    repo.add_request(&input).unwrap();

    assert!(repo
        .request_exists("get", "ORDERS/open", "STATE=new", "")
        .unwrap());
    assert!(!repo.request_exists("POST", "orders/open", "state=NEW", "").unwrap());
}

#[test]
fn test_empty_query_and_body_match_only_empty() {
    let repo = repository();
    let response = json_response(&repo);
    repo.add_request(&get_request_input("plain", response.id)).unwrap();

    let mut with_query = get_request_input("plain", response.id);
    with_query.query = "v=1".to_string();
    repo.add_request(&with_query).unwrap();

    assert!(repo.request_exists("GET", "plain", "", "").unwrap());
    assert!(repo.request_exists("GET", "plain", "v=1", "").unwrap());
    assert!(!repo.request_exists("GET", "plain", "v=2", "").unwrap());
    assert!(!repo.request_exists("GET", "plain", "", "some-body").unwrap());

    let stored = repo.get_request("GET", "plain", "", "").unwrap();
    assert_eq!(stored.query, "");
}

#[test]
fn test_request_exists_rejects_unknown_method() {
    let repo = repository();
    assert!(matches!(
        repo.request_exists("HEAD", "x", "", ""),
        Err(RepositoryError::UnknownMethod(_))
    ));
    assert!(matches!(
        repo.get_request("OPTIONS", "x", "", ""),
        Err(RepositoryError::UnknownMethod(_))
    ));
}

#[test]
fn test_get_request_fails_without_match() {
    let repo = repository();
    assert!(matches!(
        repo.get_request("GET", "missing", "", ""),
        Err(RepositoryError::NoMatchingRequest)
    ));
    assert!(matches!(
        repo.get_request_by_id(1),
        Err(RepositoryError::RequestNotFound(1))
    ));
}

// ============================================================================
// Cascade delete
// ============================================================================

#[test]
fn test_remove_last_request_cascades_to_response() {
    let repo = repository();
    let response = json_response(&repo);
    let request = repo.add_request(&get_request_input("only", response.id)).unwrap();

    repo.remove_request(request.id).unwrap();
    assert!(!repo.request_exists_for_id(request.id));
    assert!(!repo.response_exists_for_id(response.id));
}

#[test]
fn test_remove_request_keeps_shared_response() {
    let repo = repository();
    let response = json_response(&repo);
    let first = repo.add_request(&get_request_input("a", response.id)).unwrap();
    let second = repo.add_request(&get_request_input("b", response.id)).unwrap();

    repo.remove_request(first.id).unwrap();
    assert!(!repo.request_exists_for_id(first.id));
    assert!(repo.request_exists_for_id(second.id));
    assert!(repo.response_exists_for_id(response.id));

    // Removing the remaining request finally deletes the shared response.
    repo.remove_request(second.id).unwrap();
    assert!(!repo.response_exists_for_id(response.id));
}

#[test]
fn test_remove_request_fails_for_unknown_id() {
    let repo = repository();
    assert!(matches!(
        repo.remove_request(12),
        Err(RepositoryError::RequestNotFound(12))
    ));
}

// ============================================================================
// Request setters
// ============================================================================

#[test]
fn test_set_request_route_is_noop_on_current_value() {
    let repo = repository();
    let response = json_response(&repo);
    let request = repo.add_request(&get_request_input("steady", response.id)).unwrap();

    // Same value (any casing, with or without slash) is a no-op, not a
    // uniqueness violation against the record itself.
    repo.set_request_route(request.id, "steady").unwrap();
    repo.set_request_route(request.id, "/STEADY").unwrap();
    assert_eq!(repo.get_request_by_id(request.id).unwrap(), request);
}

#[test]
fn test_set_request_route_checks_uniqueness() {
    let repo = repository();
    let response = json_response(&repo);
    repo.add_request(&get_request_input("taken", response.id)).unwrap();
    let request = repo.add_request(&get_request_input("free", response.id)).unwrap();

    assert!(matches!(
        repo.set_request_route(request.id, "taken"),
        Err(RepositoryError::RequestAlreadyExists)
    ));
    repo.set_request_route(request.id, "/renamed").unwrap();
    assert_eq!(repo.get_request_by_id(request.id).unwrap().route, "renamed");
}

#[test]
fn test_set_request_query_and_body() {
    let repo = repository();
    let response = json_response(&repo);
    let request = repo.add_request(&get_request_input("r", response.id)).unwrap();

    repo.set_request_query(request.id, "page=2").unwrap();
    repo.set_request_body(request.id, r#"{"filter":"x"}"#).unwrap();
    let updated = repo.get_request_by_id(request.id).unwrap();
    assert_eq!(updated.query, "page=2");
    assert_eq!(updated.body, r#"{"filter":"x"}"#);

    // A second definition may not be updated onto the same tuple.
    let second = repo.add_request(&get_request_input("r", response.id)).unwrap();
    assert!(matches!(
        repo.set_request_query(second.id, "page=2"),
        Err(RepositoryError::RequestAlreadyExists)
    ));
}

#[test]
fn test_set_request_method() {
    let repo = repository();
    let response = json_response(&repo);
    let request = repo.add_request(&get_request_input("m", response.id)).unwrap();

    assert!(matches!(
        repo.set_request_method(request.id, "CONNECT"),
        Err(RepositoryError::UnknownMethod(_))
    ));

    repo.set_request_method(request.id, "post").unwrap();
    assert_eq!(
        repo.get_request_by_id(request.id).unwrap().method,
        HttpMethod::Post
    );

    // Changing back onto an existing tuple is rejected.
    repo.add_request(&get_request_input("m", response.id)).unwrap();
    assert!(matches!(
        repo.set_request_method(request.id, "GET"),
        Err(RepositoryError::RequestAlreadyExists)
    ));
}

#[test]
fn test_set_request_response_id() {
    let repo = repository();
    let first = json_response(&repo);
    let second = repo
        .add_response(&ResponseDefinition {
            id: 0,
            status_code: 404,
            body: String::new(),
            mime_type: String::new(),
        })
        .unwrap();
    let request = repo.add_request(&get_request_input("r", first.id)).unwrap();

    assert!(matches!(
        repo.set_request_response_id(request.id, 99),
        Err(RepositoryError::UnknownResponse(99))
    ));
    assert!(matches!(
        repo.set_request_response_id(77, second.id),
        Err(RepositoryError::RequestNotFound(77))
    ));

    repo.set_request_response_id(request.id, second.id).unwrap();
    assert_eq!(
        repo.get_request_by_id(request.id).unwrap().response_id,
        second.id
    );
}

// ============================================================================
// Bulk route update
// ============================================================================

#[test]
fn test_set_method_for_route() {
    let repo = repository();
    let response = json_response(&repo);
    let a = repo.add_request(&get_request_input("bulk", response.id)).unwrap();
    let mut with_query = get_request_input("BULK", response.id);
    with_query.query = "v=1".to_string();
    let b = repo.add_request(&with_query).unwrap();
    let other = repo.add_request(&get_request_input("other", response.id)).unwrap();

    repo.set_method_for_route("/bulk", "PUT").unwrap();

    assert_eq!(repo.get_request_by_id(a.id).unwrap().method, HttpMethod::Put);
    assert_eq!(repo.get_request_by_id(b.id).unwrap().method, HttpMethod::Put);
    assert_eq!(
        repo.get_request_by_id(other.id).unwrap().method,
        HttpMethod::Get
    );

    assert!(matches!(
        repo.set_method_for_route("bulk", "FETCH"),
        Err(RepositoryError::UnknownMethod(_))
    ));
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_full_dumps() {
    let repo = repository();
    assert!(repo.get_responses().is_empty());
    assert!(repo.get_requests().is_empty());

    let response = json_response(&repo);
    repo.add_request(&get_request_input("a", response.id)).unwrap();
    repo.add_request(&get_request_input("b", response.id)).unwrap();

    assert_eq!(repo.get_responses().len(), 1);
    assert_eq!(repo.get_requests().len(), 2);
}
