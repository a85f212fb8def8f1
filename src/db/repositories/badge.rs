use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::{badges, prelude::*, user_badges};

/// Catalog metadata inlined into a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeInfo {
    pub key: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeGrant {
    pub id: i32,
    pub user_id: Uuid,
    pub badge_key: String,
    pub earned_at: DateTime<Utc>,
    pub badge: BadgeInfo,
}

pub struct BadgeRepository {
    conn: DatabaseConnection,
}

impl BadgeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn has_grant(&self, user_id: Uuid, badge_key: &str) -> Result<bool> {
        let existing = UserBadges::find()
            .filter(user_badges::Column::UserId.eq(user_id))
            .filter(user_badges::Column::BadgeKey.eq(badge_key))
            .one(&self.conn)
            .await
            .context("Failed to query badge grant")?;

        Ok(existing.is_some())
    }

    /// Inserts a grant unless the (user, badge) pair already holds one.
    ///
    /// Returns `false` when a concurrent writer got there first, whether the
    /// backend reports that as a skipped `ON CONFLICT` or as a unique violation.
    pub async fn insert_grant(
        &self,
        user_id: Uuid,
        badge_key: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<bool> {
        let active_model = user_badges::ActiveModel {
            user_id: Set(user_id),
            badge_key: Set(badge_key.to_string()),
            earned_at: Set(earned_at),
            ..Default::default()
        };

        let result = UserBadges::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    user_badges::Column::UserId,
                    user_badges::Column::BadgeKey,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await;

        match result {
            Ok(rows) => Ok(rows > 0),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to insert badge grant")),
        }
    }

    /// Grants for a user, earliest first, with catalog metadata joined in.
    ///
    /// Keys missing from the catalog keep their grant and carry empty metadata.
    pub async fn grants_for_user(&self, user_id: Uuid) -> Result<Vec<BadgeGrant>> {
        let grants = UserBadges::find()
            .filter(user_badges::Column::UserId.eq(user_id))
            .order_by_asc(user_badges::Column::EarnedAt)
            .order_by_asc(user_badges::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list badge grants")?;

        if grants.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = grants.iter().map(|g| g.badge_key.clone()).collect();
        let catalog: HashMap<String, badges::Model> = Badges::find()
            .filter(badges::Column::Key.is_in(keys))
            .all(&self.conn)
            .await
            .context("Failed to load badge catalog")?
            .into_iter()
            .map(|b| (b.key.clone(), b))
            .collect();

        Ok(grants
            .into_iter()
            .map(|grant| {
                let badge = catalog.get(&grant.badge_key).map_or_else(
                    || BadgeInfo {
                        key: grant.badge_key.clone(),
                        name: String::new(),
                        description: String::new(),
                    },
                    |b| BadgeInfo {
                        key: b.key.clone(),
                        name: b.name.clone(),
                        description: b.description.clone(),
                    },
                );

                BadgeGrant {
                    id: grant.id,
                    user_id: grant.user_id,
                    badge_key: grant.badge_key,
                    earned_at: grant.earned_at,
                    badge,
                }
            })
            .collect())
    }

    pub async fn catalog(&self) -> Result<Vec<badges::Model>> {
        Badges::find()
            .order_by_asc(badges::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list badge catalog")
    }

    /// Inserts catalog entries whose key is not present yet. Existing rows are left untouched.
    pub async fn seed_catalog(&self, entries: &[(&str, &str, &str)]) -> Result<u64> {
        let mut inserted = 0;

        for (key, name, description) in entries {
            let active_model = badges::ActiveModel {
                key: Set((*key).to_string()),
                name: Set((*name).to_string()),
                description: Set((*description).to_string()),
                ..Default::default()
            };

            inserted += Badges::insert(active_model)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::column(badges::Column::Key)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.conn)
                .await
                .with_context(|| format!("Failed to seed badge {key}"))?;
        }

        Ok(inserted)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
