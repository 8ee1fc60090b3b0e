//! Shared helpers for API integration tests
//!
//! Each test gets a fresh migrated database from `#[sqlx::test]`; the
//! context wraps it in the real router plus an admin and a regular user
//! with ready-made tokens.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use dhriti_api::app::{build_router, AppState};
use dhriti_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use dhriti_shared::auth::jwt::{create_token, Claims};
use dhriti_shared::auth::password::hash_password;
use dhriti_shared::models::user::{CreateUser, User, UserRole};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "secret123";

/// Test context: router, pool and two authenticated users
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub admin: User,
    pub admin_token: String,
    pub user: User,
    pub user_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            json_logs: false,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 5,
            run_migrations: false,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expires_minutes: 60,
        },
    }
}

impl TestContext {
    pub async fn new(db: PgPool) -> Self {
        let admin = insert_user(&db, "admin@dhriti.test", UserRole::Admin).await;
        let user = insert_user(&db, "worker@dhriti.test", UserRole::User).await;

        let admin_token = token_for(&admin);
        let user_token = token_for(&user);

        let app = build_router(AppState::new(db.clone(), test_config()));

        Self {
            db,
            app,
            admin,
            admin_token,
            user,
            user_token,
        }
    }

    /// Sends a request and returns the status and parsed JSON body
    ///
    /// Empty bodies (204) come back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                self.send_raw(method, uri, token, Some("application/json"), json.to_string())
                    .await
            }
            None => self.send_raw(method, uri, token, None, String::new()).await,
        }
    }

    /// Like [`send`](Self::send) with a raw body and optional content type
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let request = builder.body(Body::from(body)).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

pub async fn insert_user(db: &PgPool, email: &str, role: UserRole) -> User {
    let mut conn = db.acquire().await.unwrap();
    User::create(
        &mut conn,
        CreateUser {
            email: email.to_string(),
            hashed_password: hash_password(TEST_PASSWORD).unwrap(),
            role,
        },
    )
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    let claims = Claims::new(user.email.clone(), user.role, chrono::Duration::minutes(60));
    create_token(&claims, TEST_SECRET).unwrap()
}
