//! Registration and login over HTTP

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::app;

#[tokio::test]
async fn test_alice_can_log_in_only_with_her_password() {
    let app = app().await;

    app.server
        .post("/logincreate/")
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .await
        .assert_status(StatusCode::CREATED);

    let rejected = app
        .server
        .post("/login/")
        .json(&json!({ "username": "alice", "password": "wrong" }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(rejected.json::<Value>()["error"], "invalid_credentials");

    let accepted = app
        .server
        .post("/login/")
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .await;
    accepted.assert_status_ok();
    let body: Value = accepted.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["message"], "Login successful");
}

#[tokio::test]
async fn test_unknown_user_gets_the_same_answer_as_a_wrong_password() {
    let app = app().await;
    app.server
        .post("/logincreate/")
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .await;

    let wrong = app
        .server
        .post("/login/")
        .json(&json!({ "username": "alice", "password": "nope" }))
        .await;
    let unknown = app
        .server
        .post("/login/")
        .json(&json!({ "username": "mallory", "password": "secret123" }))
        .await;

    assert_eq!(wrong.status_code(), unknown.status_code());
    assert_eq!(wrong.json::<Value>(), unknown.json::<Value>());
}

#[tokio::test]
async fn test_login_without_fields_is_rejected() {
    let app = app().await;
    app.server
        .post("/login/")
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post("/login/")
        .text("not json")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_list_mirrors_shape_and_hides_hash() {
    let app = app().await;

    let response = app
        .server
        .post("/logincreate/")
        .json(&json!([
            { "username": "alice", "password": "secret123" },
            { "username": "bob", "password": "hunter22" }
        ]))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["username"], "bob");
    for item in items {
        assert!(item.get("password").is_none());
        assert!(item["userid"].is_i64());
    }
}

#[tokio::test]
async fn test_duplicate_username_is_a_validation_error() {
    let app = app().await;
    app.server
        .post("/logincreate/")
        .json(&json!({ "username": "alice", "password": "secret123" }))
        .await;

    let response = app
        .server
        .post("/logincreate/")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"][0].as_str().unwrap().starts_with("username:"));
}

#[tokio::test]
async fn test_listing_credentials_never_exposes_hashes() {
    let app = app().await;
    assert_eq!(app.server.get("/logincreate/").await.json::<Value>(), json!([]));

    app.server
        .post("/logincreate/")
        .json(&json!([
            { "username": "alice", "password": "secret123" },
            { "username": "bob", "password": "hunter22" }
        ]))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.get("/logincreate/").await;
    response.assert_status_ok();
    let listed: Value = response.json();
    let items = listed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["username"], "alice");
    assert_eq!(items[1]["username"], "bob");
    for item in items {
        assert!(item.get("password").is_none());
        assert!(!item.to_string().contains("$argon2"));
    }
}
