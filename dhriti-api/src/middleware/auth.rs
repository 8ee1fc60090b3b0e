//! Authentication layers
//!
//! [`jwt_auth_layer`] validates the bearer token and stores the caller's
//! [`AuthContext`] in request extensions. [`admin_only`] must run after it
//! and rejects non-admin callers with 403.
//!
//! ```text
//! Router::new()
//!     .route(...)
//!     .layer(from_fn(admin_only))                      // runs second
//!     .layer(from_fn_with_state(state, jwt_auth_layer)) // runs first
//! ```

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dhriti_shared::auth::{
    authorization::require_admin,
    middleware::{authenticate, AuthContext},
};

/// Resolves the bearer token into an [`AuthContext`] extension
///
/// # Errors
///
/// 401 when the header is missing, isn't `Bearer`, or the token is invalid or
/// expired.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request authentication");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Lets only admins through
pub async fn admin_only(req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    require_admin(auth)?;

    Ok(next.run(req).await)
}
