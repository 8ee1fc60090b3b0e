//! Database models for Dhriti
//!
//! This module contains all database models and their SQL operations.
//! Operations take `&mut PgConnection` so callers decide whether they run
//! inside a request transaction or on a bare pooled connection.
//!
//! # Models
//!
//! - `user`: User accounts, roles and credentials
//! - `profile`: One-to-one display profile for a user
//! - `project`: Projects and their reviewer workflow metadata
//! - `assignment`: User-to-project assignments with task statistics
//! - `review`: Ratings users receive on a project
//!
//! # Example
//!
//! ```no_run
//! use dhriti_shared::models::user::{CreateUser, User, UserRole};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let mut tx = pool.begin().await?;
//! let user = User::create(
//!     &mut tx,
//!     CreateUser {
//!         email: "user@example.com".to_string(),
//!         hashed_password: "$argon2id$...".to_string(),
//!         role: UserRole::User,
//!     },
//! )
//! .await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

pub mod assignment;
pub mod profile;
pub mod project;
pub mod review;
pub mod user;
