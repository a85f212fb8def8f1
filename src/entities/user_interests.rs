use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_interests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_email: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub interest_id: i32,

    pub value: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::interests::Entity",
        from = "Column::InterestId",
        to = "super::interests::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Interest,
}

impl Related<super::interests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Interest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
