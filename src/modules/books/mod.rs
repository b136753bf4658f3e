pub mod entity;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookclub_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils::openapi::{doc_body, doc_error, doc_list, doc_path_param, doc_response};

/// Book catalogue with embedded reviews
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let title_param = json!([doc_path_param("title")]);
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books with their reviews",
                        "tags": ["Books"],
                        "responses": {
                            "200": doc_list("Books", "Book")
                        }
                    },
                    "post": {
                        "summary": "Register a book as the current user",
                        "tags": ["Books"],
                        "security": secured,
                        "requestBody": doc_body("CreateBook"),
                        "responses": {
                            "201": doc_response("Book created", "Message"),
                            "400": doc_error("Missing or blank fields"),
                            "401": doc_error("Missing or invalid token"),
                            "409": doc_error("Book already exists")
                        }
                    }
                },
                "/books/{title}": {
                    "get": {
                        "summary": "Get a book with its reviews",
                        "tags": ["Books"],
                        "parameters": title_param,
                        "responses": {
                            "200": doc_response("Book", "Book"),
                            "404": doc_error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Edit a book you registered",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": title_param,
                        "requestBody": doc_body("BookPatch"),
                        "responses": {
                            "200": doc_response("Book edited", "Message"),
                            "400": doc_error("No data has been changed"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Book or new owner not found"),
                            "409": doc_error("Book already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book you registered",
                        "tags": ["Books"],
                        "security": secured,
                        "parameters": title_param,
                        "responses": {
                            "200": doc_response("Book deleted", "Message"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CreateBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "gender": { "type": "string" }
                        },
                        "required": ["title", "description", "gender"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "gender": { "type": "string" },
                            "registered_by": { "type": "string", "format": "email" }
                        }
                    },
                    "BookReview": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "rating": { "type": "integer", "minimum": 0, "maximum": 5 },
                            "comment": { "type": ["string", "null"] },
                            "user_email": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "rating", "user_email", "created_at"]
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "gender": { "type": "string" },
                            "registered_by": { "type": "string" },
                            "reviews": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/BookReview" }
                            }
                        },
                        "required": ["id", "title", "description", "gender", "registered_by", "reviews"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_books",
            up: r#"
                CREATE TABLE books (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    title         TEXT NOT NULL UNIQUE,
                    description   TEXT NOT NULL,
                    gender        TEXT NOT NULL,
                    registered_by TEXT NOT NULL
                        REFERENCES users (email) ON UPDATE CASCADE ON DELETE CASCADE
                );
                CREATE INDEX books_registered_by ON books (registered_by);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
