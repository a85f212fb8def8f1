use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "interests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub key: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_interests::Entity")]
    UserInterests,
}

impl Related<super::user_interests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserInterests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
