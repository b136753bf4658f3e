//! Checks run before any mutation reaches the store.
//!
//! Handlers call these in a fixed order: existence, ownership, non-empty
//! patch, uniqueness, cross-references, range. The first failure wins and
//! nothing is written.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 5;

/// Entity kinds named in guard failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Book,
    Club,
    Review,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::User => "User",
            Resource::Book => "Book",
            Resource::Club => "Club",
            Resource::Review => "Review",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("Access denied")]
    Forbidden,

    #[error("{0} already exists")]
    Conflict(Resource),

    #[error("No data has been changed")]
    NothingChanged,

    #[error("Rating must be an integer from 0 to 5")]
    InvalidRating,

    #[error("{0}")]
    Invalid(String),
}

/// A partial update whose fields are all optional.
pub trait Patch {
    /// True when no mutable field was supplied.
    fn is_empty(&self) -> bool;
}

/// Unwrap a looked-up record or fail with NotFound.
pub fn found<T>(record: Option<T>, resource: Resource) -> Result<T, GuardError> {
    record.ok_or(GuardError::NotFound(resource))
}

/// The caller's identity must equal the owner field. Both sides have the
/// owner field's own type, so an email is never compared with an id.
pub fn ensure_owner<K>(caller: &K, owner: &K) -> Result<(), GuardError>
where
    K: PartialEq + ?Sized,
{
    if caller == owner {
        Ok(())
    } else {
        Err(GuardError::Forbidden)
    }
}

pub fn ensure_not_empty<P: Patch>(patch: &P) -> Result<(), GuardError> {
    if patch.is_empty() {
        Err(GuardError::NothingChanged)
    } else {
        Ok(())
    }
}

/// `holder` is the id of the record that currently owns the new key value, if
/// any; `target` is the record being written (`None` on create). Writing a
/// key onto the record that already holds it is allowed.
pub fn ensure_unique<Id: PartialEq>(
    holder: Option<Id>,
    target: Option<Id>,
    resource: Resource,
) -> Result<(), GuardError> {
    match (holder, target) {
        (None, _) => Ok(()),
        (Some(holder), Some(target)) if holder == target => Ok(()),
        (Some(_), _) => Err(GuardError::Conflict(resource)),
    }
}

/// A foreign-key field must point at an existing record.
pub fn ensure_exists(exists: bool, resource: Resource) -> Result<(), GuardError> {
    if exists {
        Ok(())
    } else {
        Err(GuardError::NotFound(resource))
    }
}

/// Reject blank values for required text fields.
pub fn require_text(value: &str, field: &str) -> Result<(), GuardError> {
    if value.trim().is_empty() {
        Err(GuardError::Invalid(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Accept a JSON integer or a string of decimal digits within the rating range.
pub fn parse_rating(value: &Value) -> Result<i32, GuardError> {
    let rating = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse::<i64>().ok()
        }
        _ => None,
    }
    .ok_or(GuardError::InvalidRating)?;

    if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&rating) {
        Ok(rating as i32)
    } else {
        Err(GuardError::InvalidRating)
    }
}
