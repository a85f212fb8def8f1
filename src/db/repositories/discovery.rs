use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{discovery_preferences, prelude::*};
use crate::models::DiscoveryPreferences as Preferences;

pub struct DiscoveryRepository {
    conn: DatabaseConnection,
}

impl DiscoveryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, email: &str) -> Result<Option<Preferences>> {
        let row = DiscoveryPreferences::find_by_id(email.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query discovery preferences")?;

        Ok(row.map(|r| Preferences {
            email: r.email,
            radius_km: r.radius_km,
        }))
    }

    pub async fn upsert(&self, email: &str, radius_km: i32) -> Result<Preferences> {
        let active_model = discovery_preferences::ActiveModel {
            email: Set(email.to_string()),
            radius_km: Set(radius_km),
        };

        DiscoveryPreferences::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(discovery_preferences::Column::Email)
                    .update_column(discovery_preferences::Column::RadiusKm)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert discovery preferences")?;

        Ok(Preferences {
            email: email.to_string(),
            radius_km,
        })
    }
}
