//! Authentication and authorization primitives
//!
//! - [`password`]: Argon2id password hashing
//! - [`jwt`]: HS256 token creation and validation
//! - [`middleware`]: bearer header to [`middleware::AuthContext`]
//! - [`authorization`]: role checks
//!
//! # Example
//!
//! ```no_run
//! use chrono::Duration;
//! use dhriti_shared::auth::jwt::{create_token, Claims};
//! use dhriti_shared::auth::password::{hash_password, verify_password};
//! use dhriti_shared::models::user::UserRole;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("password123")?;
//! assert!(verify_password("password123", &hash)?);
//!
//! let claims = Claims::new("user@example.com", UserRole::User, Duration::minutes(60));
//! let token = create_token(&claims, "a-secret-that-is-at-least-32-bytes-long")?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
