use axum::{http::StatusCode, routing::get, Extension, Json, Router};
use bookclub_authz::{guard, Resource};
use bookclub_http::{AppError, CurrentUser, JsonBody, PathParam};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use super::entity::{self, NewReview, ReviewChanges};
use super::models::{AverageRating, CreateReview, ReviewDto, ReviewPatch};
use crate::modules::books::entity as book_entity;
use crate::modules::users::caller_account;
use crate::utils::{message, StoreResultExt};

pub fn router() -> Router {
    Router::new()
        .route("/reviews", get(list_reviews).post(register_review))
        .route("/reviews/", get(list_reviews))
        .route("/reviews/by-book/{title}", get(reviews_by_book))
        .route("/reviews/average-rating/{title}", get(average_rating))
        .route(
            "/reviews/{id}",
            get(get_review).put(edit_review).delete(delete_review),
        )
}

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request("Review id must be an integer"))
}

async fn load_review(db: &DatabaseConnection, raw_id: &str) -> Result<entity::Model, AppError> {
    let id = parse_id(raw_id)?;
    Ok(guard::found(
        entity::find_by_id(db, id).await.internal("load review")?,
        Resource::Review,
    )?)
}

async fn book_exists(db: &DatabaseConnection, title: &str) -> Result<bool, AppError> {
    Ok(book_entity::find_by_title(db, title)
        .await
        .internal("check book")?
        .is_some())
}

async fn register_review(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    JsonBody(req): JsonBody<CreateReview>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = caller_account(&db, &caller).await?;
    let (rating, comment, book_title) = req
        .complete()
        .ok_or_else(|| AppError::bad_request("Information is missing to make a review"))?;

    guard::ensure_exists(book_exists(&db, &book_title).await?, Resource::Book)?;
    let rating = guard::parse_rating(&rating)?;

    let review = entity::create(
        &db,
        NewReview {
            rating,
            comment: Some(comment),
            user_email: account.email,
            book_title,
        },
    )
    .await
    .internal("save review")?;

    tracing::info!(review_id = review.id, book = %review.book_title, "review created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Review created successfully", "id": review.id })),
    ))
}

async fn list_reviews(
    Extension(db): Extension<DatabaseConnection>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let reviews = entity::find_all(&db).await.internal("list reviews")?;
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

/// Reviews of one book; an unknown title has none.
async fn reviews_by_book(
    Extension(db): Extension<DatabaseConnection>,
    PathParam(title): PathParam<String>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let reviews = entity::reviews_for_book(&db, &title)
        .await
        .internal("list reviews")?;
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

async fn get_review(
    Extension(db): Extension<DatabaseConnection>,
    PathParam(id): PathParam<String>,
) -> Result<Json<ReviewDto>, AppError> {
    let review = load_review(&db, &id).await?;
    Ok(Json(review.into()))
}

async fn edit_review(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(id): PathParam<String>,
    JsonBody(patch): JsonBody<ReviewPatch>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let review = load_review(&db, &id).await?;
    guard::ensure_owner(account.email.as_str(), review.user_email.as_str())?;
    guard::ensure_not_empty(&patch)?;

    let rating = patch
        .rating
        .as_ref()
        .map(guard::parse_rating)
        .transpose()?;
    if let Some(title) = &patch.book_title {
        guard::ensure_exists(book_exists(&db, title).await?, Resource::Book)?;
    }

    let changes = ReviewChanges {
        rating,
        comment: patch.comment,
        book_title: patch.book_title,
    };
    entity::update(&db, review.id, changes)
        .await
        .internal("save review")?;

    tracing::info!(review_id = review.id, "review edited");
    Ok(message("Review edited successfully"))
}

async fn delete_review(
    Extension(db): Extension<DatabaseConnection>,
    caller: CurrentUser,
    PathParam(id): PathParam<String>,
) -> Result<Json<Value>, AppError> {
    let account = caller_account(&db, &caller).await?;
    let review = load_review(&db, &id).await?;
    guard::ensure_owner(account.email.as_str(), review.user_email.as_str())?;

    if !entity::delete(&db, review.id).await.internal("delete review")? {
        return Err(guard::GuardError::NotFound(Resource::Review).into());
    }

    tracing::info!(review_id = review.id, "review deleted");
    Ok(message("Review deleted successfully"))
}

async fn average_rating(
    Extension(db): Extension<DatabaseConnection>,
    PathParam(title): PathParam<String>,
) -> Result<Json<AverageRating>, AppError> {
    let book = guard::found(
        book_entity::find_by_title(&db, &title)
            .await
            .internal("load book")?,
        Resource::Book,
    )?;
    let ratings: Vec<i32> = entity::reviews_for_book(&db, &book.title)
        .await
        .internal("list reviews")?
        .into_iter()
        .map(|r| r.rating)
        .collect();

    Ok(Json(AverageRating::of(book.title, &ratings)))
}
