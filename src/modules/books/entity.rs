use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub title: String,
    pub description: String,
    /// Genre or category
    pub gender: String,
    /// Email of the registering user
    pub registered_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub gender: String,
    pub registered_by: String,
}

/// Column changes for an existing book; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub gender: Option<String>,
    pub registered_by: Option<String>,
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Id).all(db).await
}

pub async fn find_by_title(db: &DatabaseConnection, title: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Title.eq(title)).one(db).await
}

pub async fn find_by_ids(db: &DatabaseConnection, ids: Vec<i32>) -> Result<Vec<Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Entity::find()
        .filter(Column::Id.is_in(ids))
        .order_by_asc(Column::Id)
        .all(db)
        .await
}

pub async fn create(db: &DatabaseConnection, book: NewBook) -> Result<Model, DbErr> {
    ActiveModel {
        id: NotSet,
        title: Set(book.title),
        description: Set(book.description),
        gender: Set(book.gender),
        registered_by: Set(book.registered_by),
    }
    .insert(db)
    .await
}

pub async fn update(db: &DatabaseConnection, id: i32, changes: BookChanges) -> Result<Model, DbErr> {
    let mut active_model = ActiveModel {
        id: Set(id),
        ..Default::default()
    };

    if let Some(title) = changes.title {
        active_model.title = Set(title);
    }
    if let Some(description) = changes.description {
        active_model.description = Set(description);
    }
    if let Some(gender) = changes.gender {
        active_model.gender = Set(gender);
    }
    if let Some(registered_by) = changes.registered_by {
        active_model.registered_by = Set(registered_by);
    }

    active_model.update(db).await
}

/// Delete a book; its reviews and club links cascade.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
