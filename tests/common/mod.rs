#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookclub_app::app::{self, App};
use bookclub_kernel::settings::{DatabaseSettings, PasswordHashSettings, Settings};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub app: App,
    router: Router,
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.database = DatabaseSettings::in_memory();
    settings.auth.password_hash = PasswordHashSettings::minimal();
    settings
}

/// A fresh in-memory database with every module migrated and started.
pub async fn spawn() -> TestApp {
    let settings = test_settings();
    let app = app::prepare(&settings).await.expect("prepare app");
    let router = app.router(&settings);
    TestApp { app, router }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, email: &str, password: &str) -> StatusCode {
        let body = serde_json::json!({ "email": email, "password": password });
        self.post("/register", None, body).await.0
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = serde_json::json!({ "email": email, "password": password });
        let (status, value) = self.post("/login", None, body).await;
        assert_eq!(status, StatusCode::OK, "login failed: {value}");
        value["access_token"].as_str().unwrap().to_string()
    }

    /// Register `email` and return a bearer token for it.
    pub async fn user(&self, email: &str) -> String {
        assert_eq!(self.register(email, "secret").await, StatusCode::CREATED);
        self.login(email, "secret").await
    }

    pub async fn book(&self, token: &str, title: &str) {
        let body = serde_json::json!({
            "title": title,
            "description": "a book",
            "gender": "fiction"
        });
        let (status, value) = self.post("/books", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "book create failed: {value}");
    }

    pub async fn club(&self, token: &str, name: &str) {
        let body = serde_json::json!({ "name": name });
        let (status, value) = self.post("/clubs", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "club create failed: {value}");
    }

    /// Post a review and return its id.
    pub async fn review(&self, token: &str, title: &str, rating: Value) -> i64 {
        let body = serde_json::json!({
            "rating": rating,
            "comment": "worth it",
            "book_title": title
        });
        let (status, value) = self.post("/reviews", Some(token), body).await;
        assert_eq!(status, StatusCode::CREATED, "review create failed: {value}");
        value["id"].as_i64().unwrap()
    }
}
