mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn register_then_lookup() {
    let app = common::spawn().await;
    assert_eq!(app.register("a@example.com", "pw").await, StatusCode::CREATED);

    let token = app.login("a@example.com", "pw").await;
    let (status, body) = app
        .request(Method::GET, "/users/a@example.com", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@example.com");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_rejects_bad_and_taken_emails() {
    let app = common::spawn().await;
    assert_eq!(app.register("invalid-email", "pw").await, StatusCode::BAD_REQUEST);
    assert_eq!(app.register("a@example.com", "pw").await, StatusCode::CREATED);
    assert_eq!(app.register("a@example.com", "other").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_with_missing_field_is_bad_request() {
    let app = common::spawn().await;
    let (status, body) = app
        .post("/register", None, json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn login_failures() {
    let app = common::spawn().await;
    app.register("a@example.com", "pw").await;

    let (status, _) = app
        .post("/login", None, json!({ "email": "nobody@example.com", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/login", None, json!({ "email": "a@example.com", "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let app = common::spawn().await;
    let token = app.user("a@example.com").await;

    let (status, _) = app.request(Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(Method::GET, "/users/a@example.com", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.request(Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let fresh = app.login("a@example.com", "secret").await;
    let (status, _) = app
        .request(Method::GET, "/users/a@example.com", Some(&fresh), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn authenticated_routes_need_a_token() {
    let app = common::spawn().await;
    app.register("a@example.com", "pw").await;

    let (status, body) = app.get("/users/a@example.com").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app
        .request(Method::GET, "/users/a@example.com", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn users_only_see_and_change_themselves() {
    let app = common::spawn().await;
    let _a = app.user("a@example.com").await;
    let b = app.user("b@example.com").await;

    let (status, _) = app
        .request(Method::GET, "/users/a@example.com", Some(&b), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Ownership is checked before the payload.
    let (status, _) = app.put("/users/a@example.com", &b, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete("/users/a@example.com", &b).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete("/users/ghost@example.com", &b).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_user_rules() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    app.register("b@example.com", "pw").await;

    let (status, body) = app.put("/users/a@example.com", &a, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No data has been changed");

    let (status, _) = app
        .put("/users/a@example.com", &a, json!({ "email": "b@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Rewriting the current value is not a conflict.
    let (status, _) = app
        .put("/users/a@example.com", &a, json!({ "email": "a@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .put("/users/a@example.com", &a, json!({ "email": "a2@example.com", "password": "new" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = app.login("a2@example.com", "new").await;
    let (status, body) = app
        .request(Method::GET, "/users/a2@example.com", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a2@example.com");
}

#[tokio::test]
async fn delete_user_twice() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;

    let (status, _) = app.delete("/users/a@example.com", &a).await;
    assert_eq!(status, StatusCode::OK);

    // The deleting token is revoked with the account.
    let (status, _) = app.delete("/users/a@example.com", &a).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let b = app.user("b@example.com").await;
    let (status, _) = app.delete("/users/a@example.com", &b).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn token_of_a_deleted_account_is_unauthorized() {
    let app = common::spawn().await;
    app.register("a@example.com", "pw").await;
    let first = app.login("a@example.com", "pw").await;
    let second = app.login("a@example.com", "pw").await;

    let (status, _) = app.delete("/users/a@example.com", &first).await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({ "title": "B1", "description": "d", "gender": "g" });
    let (status, _) = app.post("/books", Some(&second), body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_routes_refuse_a_token_of_a_deleted_account() {
    let app = common::spawn().await;
    app.user("b@example.com").await;
    app.register("a@example.com", "pw").await;
    let first = app.login("a@example.com", "pw").await;
    let second = app.login("a@example.com", "pw").await;
    let (status, _) = app.delete("/users/a@example.com", &first).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(Method::GET, "/users/b@example.com", Some(&second), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User no longer exists");
    let (status, _) = app
        .put("/users/b@example.com", &second, json!({ "password": "x" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.delete("/users/b@example.com", &second).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.post("/logout", Some(&second), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_path_segments_get_a_json_error() {
    let app = common::spawn().await;
    for uri in ["/books/%FF", "/clubs/%FF", "/reviews/by-book/%FF"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["message"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let app = common::spawn().await;
    let (status, body) = app.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, doc) = app.get("/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/register", "/books/{title}", "/clubs/average-books-read", "/reviews/{id}"] {
        assert!(doc["paths"][path].is_object(), "missing {path}");
    }
}
