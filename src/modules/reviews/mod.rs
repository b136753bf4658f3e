pub mod entity;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookclub_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils::openapi::{doc_body, doc_error, doc_list, doc_path_param, doc_response};

pub struct ReviewsModule;

impl ReviewsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::debug!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer" }
        }]);
        let title_param = json!([doc_path_param("title")]);
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/reviews": {
                    "get": {
                        "summary": "List all reviews",
                        "tags": ["Reviews"],
                        "responses": { "200": doc_list("Reviews", "Review") }
                    },
                    "post": {
                        "summary": "Review a book as the current user",
                        "tags": ["Reviews"],
                        "security": secured,
                        "requestBody": doc_body("CreateReview"),
                        "responses": {
                            "201": doc_response("Review created", "ReviewCreated"),
                            "400": doc_error("Missing fields or rating out of range"),
                            "404": doc_error("Book not found")
                        }
                    }
                },
                "/reviews/by-book/{title}": {
                    "get": {
                        "summary": "List the reviews of one book",
                        "tags": ["Reviews"],
                        "parameters": title_param,
                        "responses": { "200": doc_list("Reviews", "Review") }
                    }
                },
                "/reviews/average-rating/{title}": {
                    "get": {
                        "summary": "Average rating of a book",
                        "tags": ["Reviews"],
                        "parameters": title_param,
                        "responses": {
                            "200": doc_response("Average", "AverageRating"),
                            "404": doc_error("Book not found")
                        }
                    }
                },
                "/reviews/{id}": {
                    "get": {
                        "summary": "Get a review",
                        "tags": ["Reviews"],
                        "parameters": id_param,
                        "responses": {
                            "200": doc_response("Review", "Review"),
                            "400": doc_error("Review id must be an integer"),
                            "404": doc_error("Review not found")
                        }
                    },
                    "put": {
                        "summary": "Edit a review you wrote",
                        "tags": ["Reviews"],
                        "security": secured,
                        "parameters": id_param,
                        "requestBody": doc_body("ReviewPatch"),
                        "responses": {
                            "200": doc_response("Review edited", "Message"),
                            "400": doc_error("No data has been changed or rating out of range"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Review or book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a review you wrote",
                        "tags": ["Reviews"],
                        "security": secured,
                        "parameters": id_param,
                        "responses": {
                            "200": doc_response("Review deleted", "Message"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Review not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CreateReview": {
                        "type": "object",
                        "properties": {
                            "rating": { "type": ["integer", "string"] },
                            "comment": { "type": "string" },
                            "book_title": { "type": "string" }
                        },
                        "required": ["rating", "comment", "book_title"]
                    },
                    "ReviewPatch": {
                        "type": "object",
                        "properties": {
                            "rating": { "type": ["integer", "string"] },
                            "comment": { "type": "string" },
                            "book_title": { "type": "string" }
                        }
                    },
                    "ReviewCreated": {
                        "type": "object",
                        "properties": {
                            "message": { "type": "string" },
                            "id": { "type": "integer" }
                        },
                        "required": ["message", "id"]
                    },
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "book_title": { "type": "string" },
                            "rating": { "type": "integer", "minimum": 0, "maximum": 5 },
                            "comment": { "type": ["string", "null"] },
                            "user_email": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "book_title", "rating", "user_email", "created_at"]
                    },
                    "AverageRating": {
                        "type": "object",
                        "properties": {
                            "book_title": { "type": "string" },
                            "average_rating": { "type": ["number", "null"] },
                            "reviews": { "type": "integer" }
                        },
                        "required": ["book_title", "average_rating", "reviews"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_reviews",
            up: r#"
                CREATE TABLE reviews (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    rating     INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
                    comment    TEXT,
                    user_email TEXT NOT NULL
                        REFERENCES users (email) ON UPDATE CASCADE ON DELETE CASCADE,
                    book_title TEXT NOT NULL
                        REFERENCES books (title) ON UPDATE CASCADE ON DELETE CASCADE,
                    created_at TEXT NOT NULL
                );
                CREATE INDEX reviews_book_title ON reviews (book_title);
                CREATE INDEX reviews_user_email ON reviews (user_email);
                "#,
        }]
    }
}

/// Create a new instance of the reviews module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new())
}
