use std::collections::HashMap;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use bookclub_authz::{guard, Resource};
use bookclub_http::{AppError, CurrentUser, JsonBody, PathParam};
use sea_orm::DatabaseConnection;
use serde_json::Value;

use super::club_book;
use super::entity::{self, ClubChanges};
use super::models::{AverageBooksRead, ClubDto, ClubPatch, CreateClub};
use crate::modules::books::{entity as book_entity, models::BookSummary};
use crate::modules::users::{caller_account, entity as user_entity};
use crate::utils::{message, StoreResultExt};

pub const ALREADY_IN_CLUB: &str = "Book is already in this club";

pub fn router() -> Router {
    Router::new()
        .route("/clubs", get(list_clubs).post(register_club))
        .route("/clubs/average-books-read", get(average_books_read))
        .route("/clubs/addbook/{name}/{title}", post(add_book))
        .route(
            "/clubs/{name}",
            get(get_club).put(edit_club).delete(delete_club),
        )
}

async fn load_club(db: &DatabaseConnection, name: &str) -> Result<entity::Model, AppError> {
    Ok(guard::found(
        entity::find_by_name(db, name).await.internal("load club")?,
        Resource::Club,
    )?)
}

async fn register_club(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    JsonBody(req): JsonBody<CreateClub>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = caller_account(&db, &caller).await?;
    guard::require_text(&req.name, "name")?;

    let holder = entity::find_by_name(&db, &req.name)
        .await
        .internal("check name")?
        .map(|c| c.id);
    guard::ensure_unique(holder, None, Resource::Club)?;

    let club = entity::create(&db, req.name, account.id)
        .await
        .unique(Resource::Club, "save club")?;

    tracing::info!(club_id = club.id, name = %club.name, "club registered");
    Ok((StatusCode::CREATED, message("Club created successfully")))
}

/// Every club with its owner and books: one query per table.
async fn list_clubs(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<Json<Vec<ClubDto>>, AppError> {
    let clubs = entity::find_all(&db).await.internal("list clubs")?;
    let club_ids = clubs.iter().map(|c| c.id).collect();
    let mut owner_ids: Vec<i32> = clubs.iter().map(|c| c.owner_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let links = club_book::links_for_clubs(&db, club_ids)
        .await
        .internal("list club books")?;
    let mut book_ids: Vec<i32> = links.iter().map(|l| l.book_id).collect();
    book_ids.sort_unstable();
    book_ids.dedup();

    let owners: HashMap<i32, String> = user_entity::find_by_ids(&db, owner_ids)
        .await
        .internal("list owners")?
        .into_iter()
        .map(|u| (u.id, u.email))
        .collect();
    let books: HashMap<i32, book_entity::Model> = book_entity::find_by_ids(&db, book_ids)
        .await
        .internal("list books")?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let mut shelves: HashMap<i32, Vec<BookSummary>> = HashMap::new();
    for link in links {
        if let Some(book) = books.get(&link.book_id) {
            shelves
                .entry(link.club_id)
                .or_default()
                .push(BookSummary::from(book.clone()));
        }
    }

    let clubs = clubs
        .into_iter()
        .map(|club| ClubDto {
            owner: owners.get(&club.owner_id).cloned().unwrap_or_default(),
            books: shelves.remove(&club.id).unwrap_or_default(),
            id: club.id,
            name: club.name,
            owner_id: club.owner_id,
        })
        .collect();
    Ok(Json(clubs))
}

async fn get_club(
    Extension(db): Extension<DatabaseConnection>,
    PathParam(name): PathParam<String>,
) -> Result<Json<ClubDto>, AppError> {
    let club = load_club(&db, &name).await?;
    let owner = user_entity::find_by_id(&db, club.owner_id)
        .await
        .internal("load owner")?
        .map(|u| u.email)
        .unwrap_or_default();
    let books = club_book::books_for_club(&db, club.id)
        .await
        .internal("list club books")?;

    Ok(Json(ClubDto {
        id: club.id,
        name: club.name,
        owner_id: club.owner_id,
        owner,
        books: books.into_iter().map(BookSummary::from).collect(),
    }))
}

async fn edit_club(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(name): PathParam<String>,
    JsonBody(patch): JsonBody<ClubPatch>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let club = load_club(&db, &name).await?;
    guard::ensure_owner(&account.id, &club.owner_id)?;
    guard::ensure_not_empty(&patch)?;

    if let Some(new_name) = &patch.name {
        guard::require_text(new_name, "name")?;
        let holder = entity::find_by_name(&db, new_name)
            .await
            .internal("check name")?
            .map(|c| c.id);
        guard::ensure_unique(holder, Some(club.id), Resource::Club)?;
    }
    if let Some(new_owner) = patch.owner_id {
        let exists = user_entity::find_by_id(&db, new_owner)
            .await
            .internal("check user")?
            .is_some();
        guard::ensure_exists(exists, Resource::User)?;
    }

    let changes = ClubChanges {
        name: patch.name,
        owner_id: patch.owner_id,
    };
    entity::update(&db, club.id, changes)
        .await
        .unique(Resource::Club, "save club")?;

    tracing::info!(club_id = club.id, "club edited");
    Ok(message("Club edited successfully"))
}

async fn delete_club(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(name): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let club = load_club(&db, &name).await?;
    guard::ensure_owner(&account.id, &club.owner_id)?;

    if !entity::delete(&db, club.id).await.internal("delete club")? {
        return Err(guard::GuardError::NotFound(Resource::Club).into());
    }

    tracing::info!(club_id = club.id, name = %club.name, "club deleted");
    Ok(message("Club deleted successfully"))
}

/// Only the club owner may attach books; any registered book can be attached.
async fn add_book(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam((name, title)): PathParam<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let club = load_club(&db, &name).await?;
    guard::ensure_owner(&account.id, &club.owner_id)?;
    let book = guard::found(
        book_entity::find_by_title(&db, &title)
            .await
            .internal("load book")?,
        Resource::Book,
    )?;

    if club_book::link_exists(&db, club.id, book.id)
        .await
        .internal("check club book")?
    {
        return Err(AppError::conflict(ALREADY_IN_CLUB));
    }
    club_book::link(&db, club.id, book.id)
        .await
        .duplicate(ALREADY_IN_CLUB, "link book to club")?;

    tracing::info!(club_id = club.id, book_id = book.id, "book added to club");
    Ok(message("Book added to club successfully"))
}

async fn average_books_read(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<Json<AverageBooksRead>, AppError> {
    let clubs = entity::find_all(&db).await.internal("list clubs")?;
    let links = club_book::find_all(&db).await.internal("list club books")?;

    Ok(Json(AverageBooksRead::from_counts(links.len(), clubs.len())))
}
