use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::entities::{prelude::*, users};
use crate::models::{NewUser, ProfileUpdate, User};

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let now = Utc::now();

        let active_model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            keycloak_id: Set(new_user.keycloak_id),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            phone_number: Set(String::new()),
            phone_number_visible: Set(false),
            country: Set(String::new()),
            job_function: Set(String::new()),
            sector: Set(String::new()),
            biography: Set(String::new()),
            profile_photo_url: Set(String::new()),
            is_blocked: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(model.into())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.find_model_by_email(email).await?.map(User::from))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_keycloak_id(&self, keycloak_id: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::KeycloakId.eq(keycloak_id))
            .one(&self.conn)
            .await
            .context("Failed to query user by Keycloak subject")?;

        Ok(user.map(User::from))
    }

    /// Case-insensitive lookup on first and last name.
    pub async fn get_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::FirstName)))
                    .eq(first_name.to_lowercase()),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::LastName)))
                    .eq(last_name.to_lowercase()),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user by name")?;

        Ok(user.map(User::from))
    }

    pub async fn get_password_hash(&self, email: &str) -> Result<Option<String>> {
        Ok(self
            .find_model_by_email(email)
            .await?
            .map(|u| u.password_hash))
    }

    /// Applies the provided profile fields. `None` when no user has that email.
    pub async fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let Some(model) = self.find_model_by_email(email).await? else {
            return Ok(None);
        };

        let mut active = model.into_active_model();
        update.merge_into(&mut active);
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(Some(updated.into()))
    }

    pub async fn set_profile_photo_url(&self, email: &str, url: &str) -> Result<Option<User>> {
        self.update_profile(
            email,
            &ProfileUpdate {
                profile_photo_url: Some(url.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Stores an already-hashed credential. Returns `false` when no row matched.
    pub async fn update_password_hash(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Email.eq(email))
            .exec(&self.conn)
            .await
            .context("Failed to update password hash")?;

        Ok(result.rows_affected > 0)
    }

    async fn find_model_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")
    }
}
