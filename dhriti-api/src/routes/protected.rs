//! Token introspection probes
//!
//! `GET /protected` echoes the caller's identity; `GET /protected/admin`
//! does the same for admins only.

use crate::error::ApiResult;
use axum::{Extension, Json};
use dhriti_shared::{
    auth::{authorization::require_admin, middleware::AuthContext},
    models::user::UserRole,
};
use serde::{Deserialize, Serialize};

/// Caller identity
#[derive(Debug, Serialize, Deserialize)]
pub struct WhoAmI {
    pub email: String,
    pub role: UserRole,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Returns the identity carried by the token
pub async fn whoami(Extension(auth): Extension<AuthContext>) -> Json<WhoAmI> {
    Json(WhoAmI {
        email: auth.email,
        role: auth.role,
        msg: None,
    })
}

/// Same as [`whoami`], 403 for non-admins
pub async fn admin_check(Extension(auth): Extension<AuthContext>) -> ApiResult<Json<WhoAmI>> {
    require_admin(&auth)?;

    Ok(Json(WhoAmI {
        email: auth.email,
        role: auth.role,
        msg: Some("Welcome, admin".to_string()),
    }))
}
