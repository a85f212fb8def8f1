use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_settings")]
#[allow(clippy::struct_excessive_bools)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_email: String,

    pub like_email: bool,
    pub like_push: bool,
    pub favorite_email: bool,
    pub favorite_push: bool,
    pub chat_email: bool,
    pub chat_push: bool,
    pub system_email: bool,
    pub system_push: bool,

    pub expo_push_token: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
