//! Error handling for the API server
//!
//! Handlers return `ApiResult<T>`; errors render as
//! `{"error": code, "message": text, "details"?: [{field, message}]}`.
//!
//! | variant              | status | code                  |
//! |----------------------|--------|-----------------------|
//! | `BadRequest`         | 400    | `bad_request`         |
//! | `Conflict`           | 400    | `conflict`            |
//! | `InvalidCredentials` | 400    | `invalid_credentials` |
//! | `Unauthorized`       | 401    | `unauthorized`        |
//! | `Forbidden`          | 403    | `forbidden`           |
//! | `NotFound`           | 404    | `not_found`           |
//! | `ValidationError`    | 422    | `validation_error`    |
//! | `InternalError`      | 500    | `internal_error`      |
//!
//! # Example
//!
//! ```
//! use dhriti_api::error::{ApiError, ApiResult};
//! use axum::Json;
//! use serde_json::{json, Value};
//!
//! async fn handler(found: bool) -> ApiResult<Json<Value>> {
//!     if !found {
//!         return Err(ApiError::NotFound("Project not found".to_string()));
//!     }
//!     Ok(Json(json!({ "ok": true })))
//! }
//! ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dhriti_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
};
use serde::{Deserialize, Serialize};
use sqlx::error::ErrorKind;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Duplicate resource (400)
    Conflict(String),

    /// Unknown email or wrong password (400)
    InvalidCredentials,

    /// Missing or invalid token (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500); the message is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
            ApiError::InvalidCredentials => (StatusCode::BAD_REQUEST, "invalid_credentials"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::ValidationError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let (message, details) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            ApiError::InvalidCredentials => ("Invalid email or password".to_string(), None),
            ApiError::ValidationError(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Human message for a unique constraint, by constraint name
fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "Email already registered",
        Some("projects_name_key") => "Project name already exists",
        Some("uq_user_project_assignment") => "Assignment already exists for this user and project",
        Some("user_profiles_user_id_key") => "User already has a profile",
        _ => "Resource already exists",
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    ApiError::Conflict(conflict_message(db_err.constraint()).to_string())
                }
                ErrorKind::ForeignKeyViolation => {
                    ApiError::NotFound("Referenced user or project not found".to_string())
                }
                ErrorKind::CheckViolation => {
                    ApiError::BadRequest("Value out of allowed range".to_string())
                }
                _ => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();

        // field_errors() iterates a HashMap
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // well-formed JSON that doesn't fit the request type
            JsonRejection::JsonDataError(err) => ApiError::invalid_field("body", err.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_field("query", rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Admin access required".to_string())
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            other => ApiError::Unauthorized(AuthError::from(other).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhriti_shared::models::user::UserRole;
    use validator::Validate;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "bad_request"),
            (ApiError::Conflict("x".into()), StatusCode::BAD_REQUEST, "conflict"),
            (ApiError::InvalidCredentials, StatusCode::BAD_REQUEST, "invalid_credentials"),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "unauthorized"),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN, "forbidden"),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND, "not_found"),
            (ApiError::ValidationError(vec![]), StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            (ApiError::InternalError("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{}", err);
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        let err = ApiError::ValidationError(vec![
            ValidationErrorDetail::new("email", "Invalid email format"),
            ValidationErrorDetail::new("password", "Password too short"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_conflict_message_by_constraint() {
        assert_eq!(conflict_message(Some("users_email_key")), "Email already registered");
        assert_eq!(conflict_message(Some("projects_name_key")), "Project name already exists");
        assert_eq!(conflict_message(None), "Resource already exists");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            ApiError::from(sqlx::Error::RowNotFound),
            ApiError::NotFound(_)
        ));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
        password: String,
    }

    #[test]
    fn test_validation_errors_become_details() {
        let sample = Sample {
            email: "nope".to_string(),
            password: "123".to_string(),
        };

        let err = ApiError::from(sample.validate().unwrap_err());
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(
                    details,
                    vec![
                        ValidationErrorDetail::new("email", "Invalid email format"),
                        ValidationErrorDetail::new("password", "Password must be at least 6 characters"),
                    ]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_authz_error_is_forbidden() {
        let err = ApiError::from(AuthzError::InsufficientRole {
            required: UserRole::Admin,
            actual: UserRole::User,
        });
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_auth_error_is_unauthorized() {
        let err = ApiError::from(AuthError::MissingCredentials);
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);
    }
}
