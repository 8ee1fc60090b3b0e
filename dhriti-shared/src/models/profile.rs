//! User profile model
//!
//! A profile holds the display fields of a user (name, phone, status). It is
//! exclusively owned by one user and removed with it.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE user_profiles (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
//!     name VARCHAR(255) NOT NULL,
//!     phone VARCHAR(64),
//!     status VARCHAR(64) NOT NULL DEFAULT 'Active'
//! );
//! ```

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Status given to profiles created without an explicit one
pub const DEFAULT_PROFILE_STATUS: &str = "Active";

/// Profile row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub status: String,
}

/// Input for creating a profile
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub status: String,
}

/// Profile fields supplied by an update request
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

impl UpdateProfile {
    /// True when no profile field carries a value; empty strings count as
    /// absent
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.phone, &self.status]
            .into_iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }

    /// True when no profile field was supplied at all
    fn is_unset(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.status.is_none()
    }

    /// Builds the row to insert when a user has no profile yet
    ///
    /// The name falls back to `fallback_name` (the user's email) since the
    /// column is required.
    pub fn into_create(self, user_id: i64, fallback_name: &str) -> CreateProfile {
        CreateProfile {
            user_id,
            name: non_empty(self.name).unwrap_or_else(|| fallback_name.to_string()),
            phone: self.phone,
            status: non_empty(self.status)
                .unwrap_or_else(|| DEFAULT_PROFILE_STATUS.to_string()),
        }
    }
}

impl UserProfile {
    /// Creates a profile
    ///
    /// # Errors
    ///
    /// Fails with a unique violation (`user_profiles_user_id_key`) if the
    /// user already has one.
    pub async fn create(conn: &mut PgConnection, data: CreateProfile) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, name, phone, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, phone, status
            "#,
        )
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.phone)
        .bind(data.status)
        .fetch_one(&mut *conn)
        .await?;

        Ok(profile)
    }

    /// Finds the profile belonging to a user
    pub async fn find_by_user_id(
        conn: &mut PgConnection,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, name, phone, status FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(profile)
    }

    /// Applies a profile update for a user, creating the row lazily
    ///
    /// - Existing profile: only the supplied fields change.
    /// - No profile and at least one field supplied: a profile is created,
    ///   with `fallback_name` standing in for a missing name.
    /// - No profile and nothing supplied: nothing happens, returns None.
    pub async fn apply_update(
        conn: &mut PgConnection,
        user_id: i64,
        fallback_name: &str,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let existing = Self::find_by_user_id(conn, user_id).await?;

        match existing {
            Some(profile) if data.is_unset() => Ok(Some(profile)),
            Some(_) => {
                let profile = sqlx::query_as::<_, UserProfile>(
                    r#"
                    UPDATE user_profiles
                    SET name = COALESCE($2, name),
                        phone = COALESCE($3, phone),
                        status = COALESCE($4, status)
                    WHERE user_id = $1
                    RETURNING id, user_id, name, phone, status
                    "#,
                )
                .bind(user_id)
                .bind(data.name)
                .bind(data.phone)
                .bind(data.status)
                .fetch_one(&mut *conn)
                .await?;

                Ok(Some(profile))
            }
            None if data.is_empty() => Ok(None),
            None => {
                let profile = Self::create(conn, data.into_create(user_id, fallback_name)).await?;
                tracing::debug!(user_id, "Created profile lazily on update");
                Ok(Some(profile))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
