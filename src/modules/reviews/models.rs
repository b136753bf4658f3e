use bookclub_authz::Patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity;

/// Body of `POST /reviews`. Fields are optional here so a missing one can be
/// reported with a single message instead of a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReview {
    /// JSON integer or digit string
    pub rating: Option<Value>,
    pub comment: Option<String>,
    pub book_title: Option<String>,
}

impl CreateReview {
    /// `(rating, comment, book_title)` when every field was supplied.
    pub fn complete(self) -> Option<(Value, String, String)> {
        Some((self.rating?, self.comment?, self.book_title?))
    }
}

/// The author is fixed; `user_email` in a patch body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<Value>,
    pub comment: Option<String>,
    pub book_title: Option<String>,
}

impl Patch for ReviewPatch {
    fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none() && self.book_title.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDto {
    pub id: i32,
    pub book_title: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_email: String,
    pub created_at: DateTime<Utc>,
}

impl From<entity::Model> for ReviewDto {
    fn from(review: entity::Model) -> Self {
        Self {
            id: review.id,
            book_title: review.book_title,
            rating: review.rating,
            comment: review.comment,
            user_email: review.user_email,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageRating {
    pub book_title: String,
    /// `None` until the book has been reviewed
    pub average_rating: Option<f64>,
    pub reviews: usize,
}

impl AverageRating {
    pub fn of(book_title: String, ratings: &[i32]) -> Self {
        let average_rating = if ratings.is_empty() {
            None
        } else {
            let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
            Some(crate::utils::round2(total as f64 / ratings.len() as f64))
        };
        Self {
            book_title,
            average_rating,
            reviews: ratings.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_review_is_detected() {
        let body: CreateReview =
            serde_json::from_str(r#"{"rating": 4, "book_title": "B1"}"#).unwrap();
        assert!(body.complete().is_none());

        let body: CreateReview =
            serde_json::from_str(r#"{"rating": "4", "comment": "ok", "book_title": "B1"}"#)
                .unwrap();
        let (rating, comment, title) = body.complete().unwrap();
        assert_eq!(rating, Value::from("4"));
        assert_eq!(comment, "ok");
        assert_eq!(title, "B1");
    }

    #[test]
    fn author_is_not_patchable() {
        let patch: ReviewPatch =
            serde_json::from_str(r#"{"user_email": "x@example.com"}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn average_of_ratings() {
        let avg = AverageRating::of("B1".into(), &[5, 4, 4]);
        assert_eq!(avg.average_rating, Some(4.33));
        assert_eq!(avg.reviews, 3);

        let none = AverageRating::of("B2".into(), &[]);
        assert_eq!(none.average_rating, None);
        assert_eq!(none.reviews, 0);
    }
}
