//! JWT access tokens
//!
//! Tokens are HS256-signed and carry the user's email as subject plus their
//! role, so request authorization needs no database round trip.
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use dhriti_shared::auth::jwt::{create_token, validate_token, Claims};
//! use dhriti_shared::models::user::UserRole;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-secret-that-is-at-least-32-bytes-long";
//! let claims = Claims::new("user@example.com", UserRole::Admin, Duration::minutes(60));
//! let token = create_token(&claims, secret)?;
//!
//! let validated = validate_token(&token, secret)?;
//! assert_eq!(validated.sub, "user@example.com");
//! assert_eq!(validated.role, UserRole::Admin);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Issuer written into and required from every token
pub const ISSUER: &str = "dhriti";

/// Token lifetime used when none is configured
pub const DEFAULT_EXPIRES_MINUTES: i64 = 60;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,

    /// Role at the time the token was issued
    pub role: UserRole,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims valid from now for `expires_in`
    pub fn new(email: impl Into<String>, role: UserRole, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: email.into(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Verifies a token and returns its claims
///
/// Checks the signature, expiry, not-before and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if `exp` has passed
/// - `JwtError::InvalidIssuer` if the issuer isn't [`ISSUER`]
/// - `JwtError::Invalid` for bad signatures and malformed tokens
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::Invalid(e.to_string()),
        })?;

    Ok(data.claims)
}
