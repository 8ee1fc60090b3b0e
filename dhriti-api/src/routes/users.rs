//! User management endpoints (admin only)
//!
//! - `GET /users` - List users with profile fields
//! - `POST /users` - Create a user with a profile
//! - `GET /users/:id` - Get one user
//! - `PUT /users/:id` - Update role, password and/or profile
//! - `DELETE /users/:id` - Delete a user and everything they own

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath},
    routes::auth::{parse_role, password_length},
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use dhriti_shared::{
    auth::password,
    models::{
        profile::{UpdateProfile, UserProfile},
        user::{CreateUser, UpdateUser, User, UserSummary},
    },
};
use serde::Deserialize;
use validator::Validate;

/// User creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "password_length"))]
    pub password: String,

    pub role: Option<String>,

    /// Display name; the email is used when absent
    pub name: Option<String>,
    pub phone: Option<String>,

    /// Profile status; `Active` when absent
    pub status: Option<String>,
}

/// User update request; absent fields are left alone
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub role: Option<String>,

    #[validate(custom(function = "password_length"))]
    pub password: Option<String>,

    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
}

impl UpdateUserRequest {
    fn profile(&self) -> UpdateProfile {
        UpdateProfile {
            name: self.name.clone(),
            phone: self.phone.clone(),
            status: self.status.clone(),
        }
    }
}

/// List users ordered by email
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(User::list_summaries(&mut conn).await?))
}

/// Create a user together with their profile
///
/// # Errors
///
/// - `400 conflict`: Email already registered
/// - `422 validation_error`: Bad email, short password or unknown role
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    req.validate()?;
    let role = parse_role(req.role.as_deref())?;

    let mut tx = state.db.begin().await?;

    if User::find_by_email(&mut tx, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hashed_password = password::hash_password(&req.password)?;

    let user = User::create(
        &mut tx,
        CreateUser {
            email: req.email,
            hashed_password,
            role,
        },
    )
    .await?;

    let profile = UserProfile::create(
        &mut tx,
        UpdateProfile {
            name: req.name,
            phone: req.phone,
            status: req.status,
        }
        .into_create(user.id, &user.email),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, role = %user.role, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserSummary {
            id: user.id,
            email: user.email,
            role: user.role,
            name: Some(profile.name),
            phone: profile.phone,
            status: Some(profile.status),
        }),
    ))
}

/// Get one user with profile fields
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserSummary>> {
    let mut conn = state.db.acquire().await?;

    let user = User::find_summary(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update a user
///
/// The password is re-hashed. Profile fields create the profile if the
/// user doesn't have one yet.
///
/// # Errors
///
/// - `404 Not Found`: Unknown user
/// - `422 validation_error`: Short password or unknown role
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserSummary>> {
    req.validate()?;

    let role = req
        .role
        .as_deref()
        .map(|raw| parse_role(Some(raw)))
        .transpose()?;

    let hashed_password = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let mut tx = state.db.begin().await?;

    let user = User::update(
        &mut tx,
        id,
        UpdateUser {
            role,
            hashed_password,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    UserProfile::apply_update(&mut tx, user.id, &user.email, req.profile()).await?;

    let summary = User::find_summary(&mut tx, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, "User updated");

    Ok(Json(summary))
}

/// Delete a user; profile, assignments and reviews go with it
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;

    if !User::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tx.commit().await?;
    tracing::info!(user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
