use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub user_email: String,
    pub book_title: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug)]
pub struct NewReview {
    pub rating: i32,
    pub comment: Option<String>,
    pub user_email: String,
    pub book_title: String,
}

/// Column changes for an existing review; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub book_title: Option<String>,
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Id).all(db).await
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(id).one(db).await
}

pub async fn reviews_for_book(db: &DatabaseConnection, title: &str) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .filter(Column::BookTitle.eq(title))
        .order_by_asc(Column::Id)
        .all(db)
        .await
}

/// Reviews of several books in one query.
pub async fn reviews_for_books(
    db: &DatabaseConnection,
    titles: Vec<String>,
) -> Result<Vec<Model>, DbErr> {
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    Entity::find()
        .filter(Column::BookTitle.is_in(titles))
        .order_by_asc(Column::Id)
        .all(db)
        .await
}

pub async fn create(db: &DatabaseConnection, review: NewReview) -> Result<Model, DbErr> {
    ActiveModel {
        id: NotSet,
        rating: Set(review.rating),
        comment: Set(review.comment),
        user_email: Set(review.user_email),
        book_title: Set(review.book_title),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    changes: ReviewChanges,
) -> Result<Model, DbErr> {
    let mut active_model = ActiveModel {
        id: Set(id),
        ..Default::default()
    };

    if let Some(rating) = changes.rating {
        active_model.rating = Set(rating);
    }
    if let Some(comment) = changes.comment {
        active_model.comment = Set(Some(comment));
    }
    if let Some(book_title) = changes.book_title {
        active_model.book_title = Set(book_title);
    }

    active_model.update(db).await
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
