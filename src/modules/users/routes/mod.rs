use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use bookclub_authz::{guard, AuthError, Authenticator, Resource};
use bookclub_http::{AppError, CurrentUser, JsonBody, PathParam};
use sea_orm::DatabaseConnection;
use serde_json::Value;

use super::entity::{self, UserChanges};
use super::models::{is_valid_email, Credentials, TokenResponse, UserDto, UserPatch};
use crate::utils::{message, StoreResultExt};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route(
            "/users/{email}",
            get(get_user).put(edit_user).delete(delete_user),
        )
}

/// Load the account behind an authenticated caller. A valid token whose user
/// has since been deleted is treated as unauthenticated.
pub async fn caller_account(
    db: &DatabaseConnection,
    caller: &CurrentUser,
) -> Result<entity::Model, AppError> {
    entity::find_by_id(db, caller.id)
        .await
        .internal("load current user")?
        .ok_or_else(|| AppError::unauthorized("User no longer exists"))
}

fn ensure_email_shape(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::bad_request("Email not valid"))
    }
}

async fn register_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth): Extension<Arc<Authenticator>>,
    JsonBody(req): JsonBody<Credentials>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    ensure_email_shape(&req.email)?;
    guard::require_text(&req.password, "password")?;

    let taken = entity::email_exists(&db, &req.email)
        .await
        .internal("check email")?;
    if taken {
        return Err(guard::GuardError::Conflict(Resource::User).into());
    }

    let password_hash = auth.hash_password(&req.password)?;
    let user = entity::create(&db, req.email, password_hash)
        .await
        .unique(Resource::User, "save user")?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, message("User created successfully")))
}

async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth): Extension<Arc<Authenticator>>,
    JsonBody(req): JsonBody<Credentials>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = guard::found(
        entity::find_by_email(&db, &req.email)
            .await
            .internal("load user")?,
        Resource::User,
    )?;

    if !auth.verify_password(&req.password, &user.password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = auth.issue_token(user.id)?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
    }))
}

async fn logout(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth): Extension<Arc<Authenticator>>,
    caller: CurrentUser,
) -> Result<Json<Value>, AppError> {
    caller_account(&db, &caller).await?;
    auth.revoke(&caller.claims);
    Ok(message("Successfully logged out"))
}

async fn get_user(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(email): PathParam<String>,
) -> Result<Json<UserDto>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let user = guard::found(
        entity::find_by_email(&db, &email).await.internal("load user")?,
        Resource::User,
    )?;
    guard::ensure_owner(&account.id, &user.id)?;

    Ok(Json(user.into()))
}

async fn edit_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth): Extension<Arc<Authenticator>>,
    caller: CurrentUser,
    PathParam(email): PathParam<String>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let user = guard::found(
        entity::find_by_email(&db, &email).await.internal("load user")?,
        Resource::User,
    )?;
    guard::ensure_owner(&account.id, &user.id)?;
    guard::ensure_not_empty(&patch)?;

    let mut changes = UserChanges::default();
    if let Some(new_email) = patch.email {
        ensure_email_shape(&new_email)?;
        let holder = entity::find_by_email(&db, &new_email)
            .await
            .internal("check email")?
            .map(|u| u.id);
        guard::ensure_unique(holder, Some(user.id), Resource::User)?;
        changes.email = Some(new_email);
    }
    if let Some(password) = patch.password {
        guard::require_text(&password, "password")?;
        changes.password_hash = Some(auth.hash_password(&password)?);
    }

    entity::update(&db, user.id, changes)
        .await
        .unique(Resource::User, "save user")?;

    tracing::info!(user_id = user.id, "user edited");
    Ok(message("User edited successfully"))
}

async fn delete_user(
    Extension(db): Extension<DatabaseConnection>,
    Extension(auth): Extension<Arc<Authenticator>>,
    caller: CurrentUser,
    PathParam(email): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let user = guard::found(
        entity::find_by_email(&db, &email).await.internal("load user")?,
        Resource::User,
    )?;
    guard::ensure_owner(&account.id, &user.id)?;

    if !entity::delete(&db, user.id).await.internal("delete user")? {
        return Err(guard::GuardError::NotFound(Resource::User).into());
    }
    auth.revoke(&caller.claims);

    tracing::info!(user_id = user.id, "user deleted");
    Ok(message("User deleted successfully"))
}
