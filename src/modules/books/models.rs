use bookclub_authz::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity;
use crate::modules::reviews::entity as review_entity;

/// Body of `POST /books`. The registering user comes from the token.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub description: String,
    pub gender: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub gender: Option<String>,
    /// Hand the book over to another registered user, by email
    pub registered_by: Option<String>,
}

impl Patch for BookPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.gender.is_none()
            && self.registered_by.is_none()
    }
}

/// Review as embedded in a book view; the book title is implied.
#[derive(Debug, Clone, Serialize)]
pub struct BookReview {
    pub id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<review_entity::Model> for BookReview {
    fn from(review: review_entity::Model) -> Self {
        Self {
            id: review.id,
            rating: review.rating,
            comment: review.comment,
            user_email: review.user_email,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDto {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub gender: String,
    pub registered_by: String,
    pub reviews: Vec<BookReview>,
}

impl BookDto {
    pub fn new(book: entity::Model, reviews: Vec<review_entity::Model>) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            gender: book.gender,
            registered_by: book.registered_by,
            reviews: reviews.into_iter().map(BookReview::from).collect(),
        }
    }
}

/// Book as listed inside a club, without its reviews.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub gender: String,
    pub registered_by: String,
}

impl From<entity::Model> for BookSummary {
    fn from(book: entity::Model) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
            gender: book.gender,
            registered_by: book.registered_by,
        }
    }
}
