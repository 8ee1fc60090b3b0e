//! Project assignment model and database operations
//!
//! An assignment links one user to one project and tracks the task counts and
//! average task time for that pairing. The pair is unique.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE project_assignments (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     project_id BIGINT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     avg_task_time_minutes INTEGER,
//!     completed_tasks INTEGER NOT NULL DEFAULT 0,
//!     pending_tasks INTEGER NOT NULL DEFAULT 0,
//!     status VARCHAR(64) NOT NULL DEFAULT 'Active',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT uq_user_project_assignment UNIQUE (user_id, project_id)
//! );
//! ```
//!
//! # Upsert semantics
//!
//! [`ProjectAssignment::upsert`] creates the row when the pair is new (status
//! from the request, else the project's status; zero counts) and otherwise
//! writes only the fields present in the request. Repeating the same payload
//! never produces a second row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use super::project::STATUS_ACTIVE;

/// Assignment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectAssignment {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,

    /// Per-assignment override of the project's default task time
    pub avg_task_time_minutes: Option<i32>,

    pub completed_tasks: i32,
    pub pending_tasks: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Fields of an assignment upsert
///
/// `user_id` and `project_id` identify the row; every other field is only
/// written when present.
#[derive(Debug, Clone, Default)]
pub struct UpsertAssignment {
    pub user_id: i64,
    pub project_id: i64,
    pub status: Option<String>,
    pub avg_task_time_minutes: Option<i32>,
    pub completed_tasks: Option<i32>,
    pub pending_tasks: Option<i32>,
}

impl UpsertAssignment {
    /// Status used when the row has to be created
    ///
    /// Request status wins, then the project's status, then `Active`.
    pub fn initial_status(&self, project_status: &str) -> String {
        match (&self.status, project_status.is_empty()) {
            (Some(status), _) => status.clone(),
            (None, false) => project_status.to_string(),
            (None, true) => STATUS_ACTIVE.to_string(),
        }
    }
}

/// Optional filters for listing assignments
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentFilter {
    pub user_id: Option<i64>,
    pub project_id: Option<i64>,
}

const ASSIGNMENT_COLUMNS: &str = "id, user_id, project_id, avg_task_time_minutes, \
    completed_tasks, pending_tasks, status, created_at";

impl ProjectAssignment {
    /// Creates or updates the assignment for a (user, project) pair
    ///
    /// The insert uses `ON CONFLICT DO NOTHING`, so two concurrent upserts of
    /// the same pair both land on the single row, and the follow-up update
    /// applies only the supplied fields.
    ///
    /// # Arguments
    ///
    /// * `conn` - Connection, normally the request transaction
    /// * `data` - Pair plus the optional fields to write
    /// * `project_status` - Status of the target project, used for new rows
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if the user or project doesn't exist.
    pub async fn upsert(
        conn: &mut PgConnection,
        data: UpsertAssignment,
        project_status: &str,
    ) -> Result<Self, sqlx::Error> {
        let created = sqlx::query(
            r#"
            INSERT INTO project_assignments (user_id, project_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, project_id) DO NOTHING
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.initial_status(project_status))
        .execute(&mut *conn)
        .await?
        .rows_affected()
            > 0;

        tracing::debug!(
            user_id = data.user_id,
            project_id = data.project_id,
            created,
            "Upserting project assignment"
        );

        let assignment = sqlx::query_as::<_, ProjectAssignment>(&format!(
            r#"
            UPDATE project_assignments
            SET status = COALESCE($3, status),
                avg_task_time_minutes = COALESCE($4, avg_task_time_minutes),
                completed_tasks = COALESCE($5, completed_tasks),
                pending_tasks = COALESCE($6, pending_tasks)
            WHERE user_id = $1 AND project_id = $2
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.status)
        .bind(data.avg_task_time_minutes)
        .bind(data.completed_tasks)
        .bind(data.pending_tasks)
        .fetch_one(&mut *conn)
        .await?;

        Ok(assignment)
    }

    /// Lists assignments, newest first, optionally filtered by user/project
    pub async fn list(
        conn: &mut PgConnection,
        filter: AssignmentFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assignments = sqlx::query_as::<_, ProjectAssignment>(&format!(
            r#"
            SELECT {ASSIGNMENT_COLUMNS}
            FROM project_assignments
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::BIGINT IS NULL OR project_id = $2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.user_id)
        .bind(filter.project_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(assignments)
    }

    /// Deletes an assignment by ID
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_assignments WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts rows for a (user, project) pair; used to check upsert idempotency
    pub async fn count_for_pair(
        conn: &mut PgConnection,
        user_id: i64,
        project_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM project_assignments WHERE user_id = $1 AND project_id = $2",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }
}
