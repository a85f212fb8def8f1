use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Subject (`sub`) of the account at the identity provider.
    #[sea_orm(unique)]
    pub keycloak_id: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id hash mirroring the identity provider credential
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    pub phone_number: String,

    pub phone_number_visible: bool,

    pub country: String,

    pub job_function: String,

    pub sector: String,

    pub biography: String,

    pub profile_photo_url: String,

    pub is_blocked: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
