mod common;

use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HOST, ORIGIN, REFERER};
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

// ===========================================================================
// Method guard
// ===========================================================================

#[tokio::test]
async fn put_and_delete_are_rejected() {
    let (server, sheets) = common::test_server(common::dev_config());
    let (server_prod, _) = common::test_server(common::test_config());

    // Development without a key admits anything.
    server
        .method(Method::PUT, "/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .await
        .assert_status_ok();

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let resp = server_prod.method(method, "/sheets").await;
        resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.json::<Value>(),
            json!({ "ok": false, "error": "An error occurred" })
        );
    }
    assert!(sheets.appends().is_empty());
}

// ===========================================================================
// API key
// ===========================================================================

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let (server, _) = common::test_server(common::keyed_config());

    let resp = server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json::<Value>()["ok"], false);
}

#[tokio::test]
async fn wrong_api_key_is_unauthorized() {
    let (server, sheets) = common::test_server(common::keyed_config());

    let resp = server
        .post("/sheets")
        .add_header("x-api-key", "not-the-key")
        .json(&json!({ "tipo": "contactos", "rows": [["a"]] }))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    assert!(sheets.appends().is_empty());
}

#[tokio::test]
async fn correct_api_key_is_admitted() {
    let (server, sheets) = common::test_server(common::keyed_config());

    server
        .post("/sheets")
        .add_header("x-api-key", common::API_KEY)
        .json(&json!({ "tipo": "contactos", "rows": [["a"]] }))
        .await
        .assert_status_ok();

    assert_eq!(sheets.appends().len(), 1);
}

#[tokio::test]
async fn keyed_preflight_is_granted_without_key() {
    let (server, sheets) = common::test_server(common::keyed_config());

    let resp = server
        .method(Method::OPTIONS, "/sheets")
        .add_header(ORIGIN, common::ALLOWED_ORIGIN)
        .add_header("access-control-request-method", "POST")
        .add_header("access-control-request-headers", "content-type, x-api-key")
        .await;

    resp.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(resp.header(ACCESS_CONTROL_ALLOW_ORIGIN), common::ALLOWED_ORIGIN);
    assert!(sheets.appends().is_empty());

    server
        .method(Method::OPTIONS, "/sheets")
        .add_header(ORIGIN, "https://evil.example")
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn method_is_checked_before_api_key() {
    let (server, _) = common::test_server(common::keyed_config());

    server
        .method(Method::DELETE, "/sheets")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

// ===========================================================================
// CORS
// ===========================================================================

#[tokio::test]
async fn disallowed_origin_is_forbidden() {
    let (server, _) = common::test_server(common::test_config());

    let resp = server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .add_header(ORIGIN, "https://evil.example")
        .await;

    resp.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(
        resp.json::<Value>(),
        json!({ "ok": false, "error": "An error occurred" })
    );
    assert!(resp.maybe_header(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn disallowed_origin_detail_shown_in_development_with_key() {
    let mut config = common::keyed_config();
    config.environment = sheets_api::config::Environment::Development;
    let (server, _) = common::test_server(config);

    let resp = server
        .get("/sheets")
        .add_header("x-api-key", common::API_KEY)
        .add_header(ORIGIN, "https://evil.example")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .await;

    // Development tolerates a foreign origin but grants nothing.
    resp.assert_status_ok();
    assert!(resp.maybe_header(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn error_after_validation_still_carries_cors_grant() {
    let (server, _) = common::test_server(common::test_config());

    let resp = server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "nope")
        .add_header(ORIGIN, common::ALLOWED_ORIGIN)
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.header(ACCESS_CONTROL_ALLOW_ORIGIN), common::ALLOWED_ORIGIN);
}

// ===========================================================================
// Referer
// ===========================================================================

#[tokio::test]
async fn referer_from_other_host_is_forbidden() {
    let (server, _) = common::test_server(common::test_config());

    let resp = server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .add_header(HOST, "bitacora.example")
        .add_header(REFERER, "https://phish.example/form")
        .await;

    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn referer_from_same_host_is_admitted() {
    let (server, _) = common::test_server(common::test_config());

    server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .add_header(HOST, "bitacora.example")
        .add_header(REFERER, "https://Bitacora.example/panel?x=1")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn referer_ignored_when_policy_disables_it() {
    let mut config = common::test_config();
    config.policy.require_referer_match = false;
    let (server, _) = common::test_server(config);

    server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .add_header(HOST, "bitacora.example")
        .add_header(REFERER, "https://phish.example/form")
        .await
        .assert_status_ok();
}

// ===========================================================================
// Development
// ===========================================================================

#[tokio::test]
async fn development_without_key_is_open() {
    let (server, sheets) = common::test_server(common::dev_config());

    let resp = server
        .post("/sheets")
        .add_header(ORIGIN, "https://anywhere.example")
        .add_header(HOST, "localhost:8080")
        .add_header(REFERER, "https://elsewhere.example/")
        .json(&json!({ "tipo": "logistica", "rows": [["x"]] }))
        .await;

    resp.assert_status_ok();
    assert!(resp.maybe_header(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    assert_eq!(sheets.appends().len(), 1);
}

#[tokio::test]
async fn development_still_grants_allowed_origin() {
    let (server, _) = common::test_server(common::dev_config());

    let resp = server
        .get("/sheets")
        .add_query_param("action", "read")
        .add_query_param("tipo", "logistica")
        .add_header(ORIGIN, common::ALLOWED_ORIGIN)
        .await;

    resp.assert_status_ok();
    assert_eq!(resp.header(ACCESS_CONTROL_ALLOW_ORIGIN), common::ALLOWED_ORIGIN);
}
