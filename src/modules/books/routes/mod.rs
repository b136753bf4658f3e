use std::collections::HashMap;

use axum::{http::StatusCode, routing::get, Extension, Json, Router};
use bookclub_authz::{guard, Resource};
use bookclub_http::{AppError, CurrentUser, JsonBody, PathParam};
use sea_orm::DatabaseConnection;
use serde_json::Value;

use super::entity::{self, BookChanges, NewBook};
use super::models::{BookDto, BookPatch, CreateBook};
use crate::modules::reviews::entity as review_entity;
use crate::modules::users::{caller_account, entity as user_entity};
use crate::utils::{message, StoreResultExt};

pub fn router() -> Router {
    Router::new()
        .route("/books", get(list_books).post(register_book))
        .route(
            "/books/{title}",
            get(get_book).put(edit_book).delete(delete_book),
        )
}

async fn register_book(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    JsonBody(req): JsonBody<CreateBook>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = caller_account(&db, &caller).await?;
    guard::require_text(&req.title, "title")?;

    let holder = entity::find_by_title(&db, &req.title)
        .await
        .internal("check title")?
        .map(|b| b.id);
    guard::ensure_unique(holder, None, Resource::Book)?;

    let book = entity::create(
        &db,
        NewBook {
            title: req.title,
            description: req.description,
            gender: req.gender,
            registered_by: account.email,
        },
    )
    .await
    .unique(Resource::Book, "save book")?;

    tracing::info!(book_id = book.id, title = %book.title, "book registered");
    Ok((StatusCode::CREATED, message("Book created successfully")))
}

/// Every book with its reviews: one query per table.
async fn list_books(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = entity::find_all(&db).await.internal("list books")?;
    let titles = books.iter().map(|b| b.title.clone()).collect();
    let reviews = review_entity::reviews_for_books(&db, titles)
        .await
        .internal("list reviews")?;

    let mut by_title: HashMap<String, Vec<review_entity::Model>> = HashMap::new();
    for review in reviews {
        by_title
            .entry(review.book_title.clone())
            .or_default()
            .push(review);
    }

    let books = books
        .into_iter()
        .map(|book| {
            let reviews = by_title.remove(&book.title).unwrap_or_default();
            BookDto::new(book, reviews)
        })
        .collect();
    Ok(Json(books))
}

async fn get_book(
    Extension(db): Extension<DatabaseConnection>,
    PathParam(title): PathParam<String>,
) -> Result<Json<BookDto>, AppError> {
    let book = guard::found(
        entity::find_by_title(&db, &title).await.internal("load book")?,
        Resource::Book,
    )?;
    let reviews = review_entity::reviews_for_book(&db, &book.title)
        .await
        .internal("list reviews")?;

    Ok(Json(BookDto::new(book, reviews)))
}

async fn edit_book(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(title): PathParam<String>,
    JsonBody(patch): JsonBody<BookPatch>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let book = guard::found(
        entity::find_by_title(&db, &title).await.internal("load book")?,
        Resource::Book,
    )?;
    guard::ensure_owner(account.email.as_str(), book.registered_by.as_str())?;
    guard::ensure_not_empty(&patch)?;

    if let Some(new_title) = &patch.title {
        guard::require_text(new_title, "title")?;
        let holder = entity::find_by_title(&db, new_title)
            .await
            .internal("check title")?
            .map(|b| b.id);
        guard::ensure_unique(holder, Some(book.id), Resource::Book)?;
    }
    if let Some(new_owner) = &patch.registered_by {
        let exists = user_entity::email_exists(&db, new_owner)
            .await
            .internal("check user")?;
        guard::ensure_exists(exists, Resource::User)?;
    }

    let changes = BookChanges {
        title: patch.title,
        description: patch.description,
        gender: patch.gender,
        registered_by: patch.registered_by,
    };
    entity::update(&db, book.id, changes)
        .await
        .unique(Resource::Book, "save book")?;

    tracing::info!(book_id = book.id, "book edited");
    Ok(message("Book edited successfully"))
}

async fn delete_book(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(title): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let book = guard::found(
        entity::find_by_title(&db, &title).await.internal("load book")?,
        Resource::Book,
    )?;
    guard::ensure_owner(account.email.as_str(), book.registered_by.as_str())?;

    if !entity::delete(&db, book.id).await.internal("delete book")? {
        return Err(guard::GuardError::NotFound(Resource::Book).into());
    }

    tracing::info!(book_id = book.id, title = %book.title, "book deleted");
    Ok(message("Book deleted successfully"))
}
