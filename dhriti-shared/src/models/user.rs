//! User model and database operations
//!
//! This module provides the User model and CRUD operations for managing user accounts.
//! Every user carries a single role that gates access to the admin endpoints.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE user_role AS ENUM ('user', 'admin');
//!
//! CREATE TABLE users (
//!     id BIGSERIAL PRIMARY KEY,
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     hashed_password VARCHAR(255) NOT NULL,
//!     role user_role NOT NULL DEFAULT 'user',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dhriti_shared::models::user::{CreateUser, User, UserRole};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let mut conn = pool.acquire().await?;
//!
//! let user = User::create(
//!     &mut conn,
//!     CreateUser {
//!         email: "user@example.com".to_string(),
//!         hashed_password: "$argon2id$...".to_string(),
//!         role: UserRole::User,
//!     },
//! )
//! .await?;
//!
//! let found = User::find_by_email(&mut conn, "user@example.com").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use std::fmt;
use std::str::FromStr;

/// Access role carried by every user and embedded in their tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user: sees their own task dashboard
    #[default]
    User,

    /// Administrator: manages users, projects and assignments
    Admin,
}

impl UserRole {
    /// Converts role to its stored/serialized string
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role grants access to admin endpoints
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub hashed_password: String,

    /// Access role
    pub role: UserRole,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

/// A user joined with the optional fields of their profile
///
/// This is the shape returned by the admin user listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub hashed_password: String,

    /// Initial role
    pub role: UserRole,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New role
    pub role: Option<UserRole>,

    /// New password hash
    pub hashed_password: Option<String>,
}

const USER_COLUMNS: &str = "id, email, hashed_password, role, created_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint `users_email_key`)
    /// - Database connection fails
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.hashed_password)
        .bind(data.role)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use dhriti_shared::models::user::User;
    /// # async fn example(conn: &mut sqlx::PgConnection) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_email(conn, "user@example.com").await? {
    ///     println!("Found user {} with role {}", user.id, user.role);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Updates role and/or password hash
    ///
    /// Returns the updated user, or None if the user doesn't exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                hashed_password = COALESCE($3, hashed_password)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.role)
        .bind(data.hashed_password)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Profile, assignments and reviews are removed by `ON DELETE CASCADE`.
    ///
    /// Returns true if the user was deleted, false if it didn't exist.
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every user with their profile fields, ordered by email
    pub async fn list_summaries(conn: &mut PgConnection) -> Result<Vec<UserSummary>, sqlx::Error> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.role, p.name, p.phone, p.status
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            ORDER BY u.email ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(users)
    }

    /// Loads one user with profile fields
    pub async fn find_summary(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<UserSummary>, sqlx::Error> {
        let user = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.role, p.name, p.phone, p.status
            FROM users u
            LEFT JOIN user_profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Counts total number of users
    pub async fn count(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}
