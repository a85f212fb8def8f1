use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::{interests, prelude::*, user_interests};
use crate::models::{InterestUpdate, InterestValue};

pub struct InterestRepository {
    conn: DatabaseConnection,
}

impl InterestRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn catalog(&self) -> Result<Vec<interests::Model>> {
        Interests::find()
            .order_by_asc(interests::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list interests")
    }

    /// Every catalog interest, with the user's choice or `false` when never set.
    pub async fn list_for_user(&self, email: &str) -> Result<Vec<InterestValue>> {
        let catalog = self.catalog().await?;

        let chosen: HashMap<i32, bool> = UserInterests::find()
            .filter(user_interests::Column::UserEmail.eq(email))
            .all(&self.conn)
            .await
            .context("Failed to list user interests")?
            .into_iter()
            .map(|ui| (ui.interest_id, ui.value))
            .collect();

        Ok(catalog
            .into_iter()
            .map(|interest| InterestValue {
                value: chosen.get(&interest.id).copied().unwrap_or(false),
                id: interest.id,
                key: interest.key,
            })
            .collect())
    }

    /// Upserts all values in one transaction.
    pub async fn upsert_for_user(&self, email: &str, updates: &[InterestUpdate]) -> Result<()> {
        let txn = self.conn.begin().await?;

        for update in updates {
            let active_model = user_interests::ActiveModel {
                user_email: Set(email.to_string()),
                interest_id: Set(update.id),
                value: Set(update.value),
            };

            UserInterests::insert(active_model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::columns([
                        user_interests::Column::UserEmail,
                        user_interests::Column::InterestId,
                    ])
                    .update_column(user_interests::Column::Value)
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .with_context(|| format!("Failed to store interest {}", update.id))?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn seed_catalog(&self, keys: &[&str]) -> Result<u64> {
        let mut inserted = 0;

        for key in keys {
            let active_model = interests::ActiveModel {
                key: Set((*key).to_string()),
                ..Default::default()
            };

            inserted += Interests::insert(active_model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(interests::Column::Key)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await
                .with_context(|| format!("Failed to seed interest {key}"))?;
        }

        Ok(inserted)
    }
}
