//! Admin summary endpoint
//!
//! ```text
//! GET /dashboard/summary
//! ```
//!
//! ```json
//! {"stats": [{"id": "activeProjects", "label": "Total Active Projects", "value": 3, "trend": "—", "icon": "📁"}, ...]}
//! ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use dhriti_shared::dashboard::{self, DashboardSummary};

/// Platform-wide statistics; admin only (gated by the router)
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    let mut conn = state.db.acquire().await?;
    let summary = dashboard::summary(&mut conn).await?;

    Ok(Json(summary))
}
