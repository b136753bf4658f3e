//! Helpers shared by the resource modules.

pub mod openapi;

use anyhow::anyhow;
use axum::Json;
use bookclub_authz::{GuardError, Resource};
use bookclub_http::AppError;
use sea_orm::{DbErr, SqlErr};
use serde_json::{json, Value};

/// `{"message": text}` success body.
pub fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// Round to two decimal places for aggregate endpoints.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Conversions from store errors to HTTP errors.
pub trait StoreResultExt<T> {
    /// Any failure is an internal error.
    fn internal(self, action: &'static str) -> Result<T, AppError>;

    /// A unique-constraint violation is a Conflict on `resource`; this covers
    /// the window between the uniqueness check and the write.
    fn unique(self, resource: Resource, action: &'static str) -> Result<T, AppError>;

    /// Like `unique`, for rows without a resource of their own: the
    /// violation becomes a Conflict carrying `message`.
    fn duplicate(self, message: &'static str, action: &'static str) -> Result<T, AppError>;
}

impl<T> StoreResultExt<T> for Result<T, DbErr> {
    fn internal(self, action: &'static str) -> Result<T, AppError> {
        self.map_err(|e| AppError::Internal(anyhow!(e).context(action)))
    }

    fn unique(self, resource: Resource, action: &'static str) -> Result<T, AppError> {
        self.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => GuardError::Conflict(resource).into(),
            _ => AppError::Internal(anyhow!(e).context(action)),
        })
    }

    fn duplicate(self, message: &'static str, action: &'static str) -> Result<T, AppError> {
        self.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(message),
            _ => AppError::Internal(anyhow!(e).context(action)),
        })
    }
}
