//! Authentication endpoints
//!
//! - `POST /auth/register` - Register new user
//! - `POST /auth/login` - Exchange credentials for an access token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, Json};
use dhriti_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(custom(function = "password_length"))]
    pub password: String,

    /// `user` (default) or `admin`
    pub role: Option<String>,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub msg: String,
    pub id: i64,
    pub role: UserRole,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,

    /// Always `bearer`
    pub token_type: String,

    pub role: UserRole,
}

/// Parses an optional role name, defaulting to `user`
/// Password length rule as a validator check
pub(crate) fn password_length(password: &str) -> Result<(), ValidationError> {
    password::validate_password_length(password).map_err(|message| {
        let mut err = ValidationError::new("length");
        err.message = Some(message.into());
        err
    })
}

pub(crate) fn parse_role(role: Option<&str>) -> ApiResult<UserRole> {
    match role {
        None => Ok(UserRole::default()),
        Some(raw) => raw
            .parse::<UserRole>()
            .map_err(|_| ApiError::invalid_field("role", "Role must be 'user' or 'admin'")),
    }
}

/// Register a new user
///
/// ```text
/// POST /auth/register
/// {"email": "user@example.com", "password": "secret1", "role": "user"}
/// ```
///
/// Response:
/// ```json
/// {"msg": "User registered successfully", "id": 1, "role": "user"}
/// ```
///
/// # Errors
///
/// - `400 conflict`: Email already registered
/// - `422 validation_error`: Bad email, short password or unknown role
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate()?;
    let role = parse_role(req.role.as_deref())?;

    let mut tx = state.db.begin().await?;

    if User::find_by_email(&mut tx, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hashed_password = password::hash_password(&req.password)?;

    // a concurrent registration still trips users_email_key -> Conflict
    let user = User::create(
        &mut tx,
        CreateUser {
            email: req.email,
            hashed_password,
            role,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    Ok(Json(RegisterResponse {
        msg: "User registered successfully".to_string(),
        id: user.id,
        role: user.role,
    }))
}

/// Login and get an access token
///
/// ```text
/// POST /auth/login
/// {"email": "user@example.com", "password": "secret1"}
/// ```
///
/// Response:
/// ```json
/// {"access_token": "eyJ...", "token_type": "bearer", "role": "user"}
/// ```
///
/// # Errors
///
/// - `400 invalid_credentials`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let mut conn = state.db.acquire().await?;

    let Some(user) = User::find_by_email(&mut conn, &req.email).await? else {
        tracing::warn!("Login attempt for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !password::verify_password(&req.password, &user.hashed_password)? {
        tracing::warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let claims = jwt::Claims::new(user.email.clone(), user.role, state.token_ttl());
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::debug!(user_id = user.id, "Issued access token");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        role: user.role,
    }))
}
