mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn edit_by_non_owner_is_forbidden_then_owner_edit_persists() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    let b = app.user("b@example.com").await;
    app.book(&a, "B1").await;

    let (status, body) = app.put("/books/B1", &b, json!({ "description": "new" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, _) = app.put("/books/B1", &a, json!({ "description": "new" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, book) = app.get("/books/B1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["description"], "new");
    assert_eq!(book["gender"], "fiction");
    assert_eq!(book["registered_by"], "a@example.com");
}

#[tokio::test]
async fn create_book_rules() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;

    let body = json!({ "title": "B1", "description": "d", "gender": "g" });
    let (status, _) = app.post("/books", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/books", Some(&a), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post("/books", Some(&a), body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Book already exists");

    let (status, _) = app.post("/books", Some(&a), json!({ "title": "B2" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn edit_book_rules() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    app.register("b@example.com", "pw").await;
    app.book(&a, "B1").await;
    app.book(&a, "B2").await;

    let (status, _) = app.put("/books/missing", &a, json!({ "gender": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put("/books/B1", &a, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.put("/books/B1", &a, json!({ "title": "B2" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.put("/books/B1", &a, json!({ "title": "B1" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put("/books/B1", &a, json!({ "registered_by": "ghost@example.com" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = app
        .put("/books/B1", &a, json!({ "registered_by": "b@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Ownership moved with the book.
    let (status, _) = app.put("/books/B1", &a, json!({ "gender": "x" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_and_get_embed_reviews() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    app.book(&a, "B1").await;
    app.book(&a, "B2").await;
    app.review(&a, "B1", json!(5)).await;
    app.review(&a, "B1", json!(3)).await;

    let (status, books) = app.get("/books").await;
    assert_eq!(status, StatusCode::OK);
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["title"], "B1");
    assert_eq!(books[0]["reviews"].as_array().unwrap().len(), 2);
    assert!(books[1]["reviews"].as_array().unwrap().is_empty());

    let (status, book) = app.get("/books/B1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["reviews"][0]["rating"], 5);
    assert_eq!(book["reviews"][0]["user_email"], "a@example.com");

    let (status, _) = app.get("/books/B9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_book_twice_and_cascade() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    let b = app.user("b@example.com").await;
    app.book(&a, "B1").await;
    app.review(&b, "B1", json!(4)).await;

    let (status, _) = app.delete("/books/B1", &b).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete("/books/B1", &a).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete("/books/B1", &a).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, reviews) = app.get("/reviews").await;
    assert!(reviews.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn renaming_a_book_carries_its_reviews() {
    let app = common::spawn().await;
    let a = app.user("a@example.com").await;
    app.book(&a, "B1").await;
    let id = app.review(&a, "B1", json!(2)).await;

    let (status, _) = app.put("/books/B1", &a, json!({ "title": "Renamed" })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, review) = app
        .request(Method::GET, &format!("/reviews/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["book_title"], "Renamed");
}
