//! Role checks
//!
//! Access control is a flat two-role model: admins manage users, projects
//! and assignments; users only see their own dashboard. The role comes from
//! the token, see [`AuthContext`].

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: UserRole, actual: UserRole },
}

/// Fails unless the caller holds exactly `required`
///
/// # Example
///
/// ```
/// use dhriti_shared::auth::authorization::require_role;
/// use dhriti_shared::auth::middleware::AuthContext;
/// use dhriti_shared::models::user::UserRole;
///
/// let auth = AuthContext { email: "a@example.com".into(), role: UserRole::User };
/// assert!(require_role(&auth, UserRole::User).is_ok());
/// assert!(require_role(&auth, UserRole::Admin).is_err());
/// ```
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if auth.role != required {
        return Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        });
    }

    Ok(())
}

/// Fails unless the caller is an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.role.is_admin() {
        return Err(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: auth.role,
        });
    }

    Ok(())
}
