use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "password_reset_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub email: String,

    /// SHA-256 hex digest of the raw token; the raw value is never stored.
    #[sea_orm(unique)]
    pub token_hash: String,

    pub expires_at: DateTimeUtc,

    #[sea_orm(default_value = false)]
    pub used: bool,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
