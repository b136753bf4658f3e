pub mod club_book;
pub mod entity;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookclub_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::utils::openapi::{doc_body, doc_error, doc_list, doc_path_param, doc_response};

/// Clubs, their book shelves and the books-per-club aggregate
pub struct ClubsModule;

impl ClubsModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ClubsModule {
    fn name(&self) -> &'static str {
        "clubs"
    }

    fn routes(&self) -> Router {
        routes::router()
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let name_param = json!([doc_path_param("name")]);
        let secured = json!([{ "bearerAuth": [] }]);

        Some(json!({
            "paths": {
                "/clubs": {
                    "get": {
                        "summary": "List clubs with their books",
                        "tags": ["Clubs"],
                        "responses": { "200": doc_list("Clubs", "Club") }
                    },
                    "post": {
                        "summary": "Create a club owned by the current user",
                        "tags": ["Clubs"],
                        "security": secured,
                        "requestBody": doc_body("CreateClub"),
                        "responses": {
                            "201": doc_response("Club created", "Message"),
                            "409": doc_error("Club already exists")
                        }
                    }
                },
                "/clubs/average-books-read": {
                    "get": {
                        "summary": "Mean number of books per club",
                        "tags": ["Clubs"],
                        "responses": { "200": doc_response("Average", "AverageBooksRead") }
                    }
                },
                "/clubs/addbook/{name}/{title}": {
                    "post": {
                        "summary": "Attach a book to a club you own",
                        "tags": ["Clubs"],
                        "security": secured,
                        "parameters": [doc_path_param("name"), doc_path_param("title")],
                        "responses": {
                            "200": doc_response("Book added", "Message"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Club or book not found"),
                            "409": doc_error("Book is already in this club")
                        }
                    }
                },
                "/clubs/{name}": {
                    "get": {
                        "summary": "Get a club with its books",
                        "tags": ["Clubs"],
                        "parameters": name_param,
                        "responses": {
                            "200": doc_response("Club", "Club"),
                            "404": doc_error("Club not found")
                        }
                    },
                    "put": {
                        "summary": "Rename a club or transfer its ownership",
                        "tags": ["Clubs"],
                        "security": secured,
                        "parameters": name_param,
                        "requestBody": doc_body("ClubPatch"),
                        "responses": {
                            "200": doc_response("Club edited", "Message"),
                            "400": doc_error("No data has been changed"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Club or new owner not found"),
                            "409": doc_error("Club already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete a club you own",
                        "tags": ["Clubs"],
                        "security": secured,
                        "parameters": name_param,
                        "responses": {
                            "200": doc_response("Club deleted", "Message"),
                            "403": doc_error("Access denied"),
                            "404": doc_error("Club not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "CreateClub": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } },
                        "required": ["name"]
                    },
                    "ClubPatch": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "owner_id": { "type": "integer" }
                        }
                    },
                    "ClubBook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "gender": { "type": "string" },
                            "registered_by": { "type": "string" }
                        }
                    },
                    "Club": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "owner_id": { "type": "integer" },
                            "owner": { "type": "string" },
                            "books": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/ClubBook" }
                            }
                        },
                        "required": ["id", "name", "owner_id", "owner", "books"]
                    },
                    "AverageBooksRead": {
                        "type": "object",
                        "properties": {
                            "average_books_read": { "type": "number" },
                            "clubs": { "type": "integer" }
                        },
                        "required": ["average_books_read", "clubs"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_clubs",
            up: r#"
                CREATE TABLE clubs (
                    id       INTEGER PRIMARY KEY AUTOINCREMENT,
                    name     TEXT NOT NULL UNIQUE,
                    owner_id INTEGER NOT NULL
                        REFERENCES users (id) ON UPDATE CASCADE ON DELETE CASCADE
                );
                CREATE INDEX clubs_owner_id ON clubs (owner_id);
                CREATE TABLE club_books (
                    club_id INTEGER NOT NULL
                        REFERENCES clubs (id) ON UPDATE CASCADE ON DELETE CASCADE,
                    book_id INTEGER NOT NULL
                        REFERENCES books (id) ON UPDATE CASCADE ON DELETE CASCADE,
                    PRIMARY KEY (club_id, book_id)
                );
                CREATE INDEX club_books_book_id ON club_books (book_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "clubs module started");
        Ok(())
    }
}

/// Create a new instance of the clubs module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(ClubsModule::new())
}
