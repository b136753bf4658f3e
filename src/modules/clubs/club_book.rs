//! Club to book association rows.

use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};

use crate::modules::books::entity as book_entity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "club_books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub club_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, DbErr> {
    Entity::find()
        .order_by_asc(Column::ClubId)
        .order_by_asc(Column::BookId)
        .all(db)
        .await
}

pub async fn link_exists(db: &DatabaseConnection, club_id: i32, book_id: i32) -> Result<bool, DbErr> {
    Ok(Entity::find_by_id((club_id, book_id)).one(db).await?.is_some())
}

pub async fn link(db: &DatabaseConnection, club_id: i32, book_id: i32) -> Result<(), DbErr> {
    Entity::insert(ActiveModel {
        club_id: Set(club_id),
        book_id: Set(book_id),
    })
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Links of several clubs in one query.
pub async fn links_for_clubs(db: &DatabaseConnection, club_ids: Vec<i32>) -> Result<Vec<Model>, DbErr> {
    if club_ids.is_empty() {
        return Ok(Vec::new());
    }
    Entity::find()
        .filter(Column::ClubId.is_in(club_ids))
        .order_by_asc(Column::BookId)
        .all(db)
        .await
}

/// Books attached to a club, in book id order.
pub async fn books_for_club(db: &DatabaseConnection, club_id: i32) -> Result<Vec<book_entity::Model>, DbErr> {
    let book_ids = links_for_clubs(db, vec![club_id])
        .await?
        .into_iter()
        .map(|link| link.book_id)
        .collect();
    book_entity::find_by_ids(db, book_ids).await
}
