use bookclub_authz::Patch;
use serde::{Deserialize, Serialize};

use crate::modules::books::models::BookSummary;

/// Body of `POST /clubs`. The owner is the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClub {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubPatch {
    pub name: Option<String>,
    /// Transfer ownership to another user id
    pub owner_id: Option<i32>,
}

impl Patch for ClubPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.owner_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClubDto {
    pub id: i32,
    pub name: String,
    pub owner_id: i32,
    /// Owner's email
    pub owner: String,
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageBooksRead {
    pub average_books_read: f64,
    pub clubs: usize,
}

impl AverageBooksRead {
    /// Mean number of linked books per club; zero when there are no clubs.
    pub fn from_counts(links: usize, clubs: usize) -> Self {
        let average_books_read = if clubs == 0 {
            0.0
        } else {
            crate::utils::round2(links as f64 / clubs as f64)
        };
        Self {
            average_books_read,
            clubs,
        }
    }
}
