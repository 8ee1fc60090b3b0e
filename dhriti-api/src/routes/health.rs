//! Liveness and health endpoints
//!
//! ```text
//! GET /        -> {"msg": "Dhriti AI backend running"}
//! GET /health  -> {"status": "healthy", "version": "0.1.0", "database": "connected"}
//! ```

use crate::app::AppState;
use axum::{extract::State, Json};
use dhriti_shared::db::pool;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the database doesn't answer
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,
}

/// Liveness message
pub async fn root() -> Json<Value> {
    Json(json!({ "msg": "Dhriti AI backend running" }))
}

/// Reports service health including database connectivity
///
/// Always 200; a dead database shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match pool::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
    })
}
