use sea_orm::entity::prelude::*;

/// One row per (user, badge) grant. Uniqueness of the pair is enforced by
/// `idx_user_badges_user_badge`; `badge_key` is not a foreign key so grants
/// for keys missing from the catalog are still recorded.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_badges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: Uuid,

    pub badge_key: String,

    pub earned_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
