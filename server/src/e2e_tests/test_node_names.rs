//! Test `/node_names` lists every node exactly once.

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;

#[tokio::test]
async fn test_node_names_lists_every_node_once() {
    let server = TestServer::new().await;

    let (status, body) = server.get("/node_names").await;

    assert_eq!(status, StatusCode::OK);
    let mut names: Vec<String> = body["node_names"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["bad", "n0", "n1"]);
}

#[tokio::test]
async fn test_node_names_on_empty_store() {
    let server = TestServer::with_fixture(
        crate::testing::Fixture::seeded(
            "CREATE TABLE nodes (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);",
        )
        .await,
    )
    .await;

    let (status, body) = server.get("/node_names").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"node_names": []}));
}
