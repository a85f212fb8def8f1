use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create_from_entity<E>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        create_from_entity(manager, &schema, Users).await?;
        create_from_entity(manager, &schema, Badges).await?;
        create_from_entity(manager, &schema, UserBadges).await?;
        create_from_entity(manager, &schema, PasswordResetTokens).await?;
        create_from_entity(manager, &schema, NotificationSettings).await?;
        create_from_entity(manager, &schema, Interests).await?;
        create_from_entity(manager, &schema, UserInterests).await?;
        create_from_entity(manager, &schema, DiscoveryPreferences).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiscoveryPreferences).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserInterests).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Interests).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NotificationSettings).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PasswordResetTokens).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserBadges).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Badges).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
