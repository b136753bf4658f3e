use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clubs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub owner_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column changes for an existing club; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct ClubChanges {
    pub name: Option<String>,
    pub owner_id: Option<i32>,
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
    Entity::find().order_by_asc(Column::Id).all(db).await
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Name.eq(name)).one(db).await
}

pub async fn create(db: &DatabaseConnection, name: String, owner_id: i32) -> Result<Model, DbErr> {
    ActiveModel {
        id: NotSet,
        name: Set(name),
        owner_id: Set(owner_id),
    }
    .insert(db)
    .await
}

pub async fn update(db: &DatabaseConnection, id: i32, changes: ClubChanges) -> Result<Model, DbErr> {
    let mut active_model = ActiveModel {
        id: Set(id),
        ..Default::default()
    };

    if let Some(name) = changes.name {
        active_model.name = Set(name);
    }
    if let Some(owner_id) = changes.owner_id {
        active_model.owner_id = Set(owner_id);
    }

    active_model.update(db).await
}

/// Delete a club; its book links cascade.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
