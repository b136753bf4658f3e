pub mod entity;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookclub_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils::openapi::{doc_body, doc_error, doc_path_param, doc_response};

pub use routes::caller_account;

/// Registration, login, logout and self-service account management
pub struct UsersModule;

impl UsersModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            token_ttl_minutes = ctx.settings.auth.token_ttl_minutes,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let email_param = json!([doc_path_param("email")]);
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/register": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Users"],
                        "requestBody": doc_body("Credentials"),
                        "responses": {
                            "201": doc_response("User created", "Message"),
                            "400": doc_error("Email not valid"),
                            "409": doc_error("User already exists")
                        }
                    }
                },
                "/login": {
                    "post": {
                        "summary": "Exchange credentials for a bearer token",
                        "tags": ["Users"],
                        "requestBody": doc_body("Credentials"),
                        "responses": {
                            "200": doc_response("Access token", "TokenResponse"),
                            "401": doc_error("Invalid credentials"),
                            "404": doc_error("User not found")
                        }
                    }
                },
                "/logout": {
                    "post": {
                        "summary": "Revoke the current token",
                        "tags": ["Users"],
                        "security": secured,
                        "responses": {
                            "200": doc_response("Token revoked", "Message"),
                            "401": doc_error("Missing or invalid token")
                        }
                    }
                },
                "/users/{email}": {
                    "get": {
                        "summary": "Get your own account",
                        "tags": ["Users"],
                        "security": secured,
                        "parameters": email_param,
                        "responses": {
                            "200": doc_response("User", "User"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("User not found")
                        }
                    },
                    "put": {
                        "summary": "Change your email or password",
                        "tags": ["Users"],
                        "security": secured,
                        "parameters": email_param,
                        "requestBody": doc_body("UserPatch"),
                        "responses": {
                            "200": doc_response("User edited", "Message"),
                            "400": doc_error("No data has been changed"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("User not found"),
                            "409": doc_error("User already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete your account and everything it owns",
                        "tags": ["Users"],
                        "security": secured,
                        "parameters": email_param,
                        "responses": {
                            "200": doc_response("User deleted", "Message"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("User not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Message": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } },
                        "required": ["message"]
                    },
                    "Credentials": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" }
                        },
                        "required": ["email", "password"]
                    },
                    "UserPatch": {
                        "type": "object",
                        "properties": {
                            "email": { "type": "string", "format": "email" },
                            "password": { "type": "string" }
                        }
                    },
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "email": { "type": "string" }
                        },
                        "required": ["id", "email"]
                    },
                    "TokenResponse": {
                        "type": "object",
                        "properties": {
                            "access_token": { "type": "string" },
                            "token_type": { "type": "string" }
                        },
                        "required": ["access_token", "token_type"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_users",
            up: r#"
                CREATE TABLE users (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    email    TEXT NOT NULL UNIQUE,
                    password TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(UsersModule::new())
}
