use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Serialises concurrent awards of the same badge to the same user.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_user_badges_user_badge ON user_badges(user_id, badge_key)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_email ON password_reset_tokens(email)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_password_reset_tokens_expires_at ON password_reset_tokens(expires_at)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_password_reset_tokens_expires_at")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_password_reset_tokens_email")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_user_badges_user_badge")
            .await?;

        Ok(())
    }
}
