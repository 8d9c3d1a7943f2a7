//! Test unknown node names yield empty data instead of errors.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_unknown_node_snapshot_is_empty() {
    let server = TestServer::new().await;

    let (status, body) = server.get("/node?name=ghost").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"node": {"name": "ghost", "rules": [], "time": null, "collections": []}})
    );
}

#[tokio::test]
async fn test_missing_name_defaults_to_empty_string() {
    let server = TestServer::new().await;

    let (status, body) = server.get("/node").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["node"]["name"], "");
    assert_eq!(body["node"]["collections"], json!([]));
}

#[tokio::test]
async fn test_unknown_node_collections_are_empty() {
    let server = TestServer::new().await;

    let (status, body) = server.get("/collections?name=ghost&time=100").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"collections": []}));
}

#[tokio::test]
async fn test_injected_node_name_matches_nothing() {
    let server = TestServer::new().await;

    let (status, body) = server
        .get("/collections?name=n0%27%20OR%20%271%27%3D%271&time=100")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"collections": []}));
}
