//! Request authentication
//!
//! Resolves the `Authorization: Bearer <token>` header into an [`AuthContext`]
//! that the HTTP layer stores in request extensions. Handlers read it with
//! axum's `Extension` extractor.
//!
//! # Example
//!
//! ```
//! use axum::http::{header, HeaderMap, HeaderValue};
//! use chrono::Duration;
//! use dhriti_shared::auth::jwt::{create_token, Claims};
//! use dhriti_shared::auth::middleware::authenticate;
//! use dhriti_shared::models::user::UserRole;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-secret-that-is-at-least-32-bytes-long";
//! let token = create_token(&Claims::new("a@example.com", UserRole::User, Duration::minutes(5)), secret)?;
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
//!
//! let auth = authenticate(&headers, secret)?;
//! assert_eq!(auth.email, "a@example.com");
//! # Ok(())
//! # }
//! ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, Claims, JwtError};
use crate::models::user::UserRole;

/// Identity of the caller, inserted into request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub email: String,
    pub role: UserRole,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken(#[source] JwtError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other),
        }
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

/// Validates the bearer token in `headers` and returns the caller's identity
///
/// # Errors
///
/// Fails when the header is missing, isn't a Bearer credential, or the token
/// doesn't validate against `secret`.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_token(token, secret)?;

    Ok(AuthContext::from(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let claims = Claims::new("admin@example.com", UserRole::Admin, Duration::minutes(5));
        let token = create_token(&claims, SECRET).unwrap();

        let auth = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(
            auth,
            AuthContext {
                email: "admin@example.com".to_string(),
                role: UserRole::Admin,
            }
        );
    }

    #[test]
    fn test_missing_header() {
        let result = authenticate(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_non_bearer_scheme() {
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat)
        ));
    }

    #[test]
    fn test_garbage_token() {
        let result = authenticate(&headers_with("Bearer garbage"), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let claims = Claims::new("a@example.com", UserRole::User, Duration::hours(-2));
        let token = create_token(&claims, SECRET).unwrap();

        let result = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET);
        assert!(matches!(result, Err(AuthError::Expired)));
    }
}
