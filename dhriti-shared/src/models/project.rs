//! Project model and database operations
//!
//! Projects group the tasks users work on. Besides name and status they carry
//! descriptive metadata and the reviewer workflow flags configured by admins.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id BIGSERIAL PRIMARY KEY,
//!     name VARCHAR(255) NOT NULL UNIQUE,
//!     status VARCHAR(64) NOT NULL DEFAULT 'Active',
//!     description TEXT,
//!     data_category VARCHAR(255),
//!     project_type VARCHAR(255),
//!     task_type VARCHAR(255),
//!     default_avg_task_time_minutes INTEGER,
//!     review_time_minutes INTEGER,
//!     max_users_per_task INTEGER,
//!     auto_submit_task BOOLEAN NOT NULL DEFAULT FALSE,
//!     allow_reviewer_edit BOOLEAN NOT NULL DEFAULT TRUE,
//!     allow_reviewer_push_back BOOLEAN NOT NULL DEFAULT TRUE,
//!     allow_reviewer_feedback BOOLEAN NOT NULL DEFAULT TRUE,
//!     reviewer_screen_mode VARCHAR(64) NOT NULL DEFAULT 'full',
//!     reviewer_guidelines TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Deleting a project cascades to its assignments and reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Status string of a running project (also the default for new rows)
pub const STATUS_ACTIVE: &str = "Active";

/// Project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub description: Option<String>,
    pub data_category: Option<String>,
    pub project_type: Option<String>,
    pub task_type: Option<String>,

    /// Task time used for assignments that don't override it
    pub default_avg_task_time_minutes: Option<i32>,

    pub review_time_minutes: Option<i32>,
    pub max_users_per_task: Option<i32>,
    pub auto_submit_task: bool,
    pub allow_reviewer_edit: bool,
    pub allow_reviewer_push_back: bool,
    pub allow_reviewer_feedback: bool,
    pub reviewer_screen_mode: String,
    pub reviewer_guidelines: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
///
/// Workflow flags left as None take the column defaults.
#[derive(Debug, Clone, Default)]
pub struct CreateProject {
    pub name: String,
    pub status: Option<String>,
    pub description: Option<String>,
    pub data_category: Option<String>,
    pub project_type: Option<String>,
    pub task_type: Option<String>,
    pub default_avg_task_time_minutes: Option<i32>,
    pub review_time_minutes: Option<i32>,
    pub max_users_per_task: Option<i32>,
    pub auto_submit_task: Option<bool>,
    pub allow_reviewer_edit: Option<bool>,
    pub allow_reviewer_push_back: Option<bool>,
    pub allow_reviewer_feedback: Option<bool>,
    pub reviewer_screen_mode: Option<String>,
    pub reviewer_guidelines: Option<String>,
}

/// Input for updating a project
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub data_category: Option<String>,
    pub project_type: Option<String>,
    pub task_type: Option<String>,
    pub default_avg_task_time_minutes: Option<i32>,
    pub review_time_minutes: Option<i32>,
    pub max_users_per_task: Option<i32>,
    pub auto_submit_task: Option<bool>,
    pub allow_reviewer_edit: Option<bool>,
    pub allow_reviewer_push_back: Option<bool>,
    pub allow_reviewer_feedback: Option<bool>,
    pub reviewer_screen_mode: Option<String>,
    pub reviewer_guidelines: Option<String>,
}

const PROJECT_COLUMNS: &str = "id, name, status, description, data_category, project_type, \
    task_type, default_avg_task_time_minutes, review_time_minutes, max_users_per_task, \
    auto_submit_task, allow_reviewer_edit, allow_reviewer_push_back, allow_reviewer_feedback, \
    reviewer_screen_mode, reviewer_guidelines, created_at";

impl Project {
    /// Creates a new project
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is taken (unique constraint `projects_name_key`)
    /// - Database connection fails
    pub async fn create(conn: &mut PgConnection, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (
                name, status, description, data_category, project_type, task_type,
                default_avg_task_time_minutes, review_time_minutes, max_users_per_task,
                auto_submit_task, allow_reviewer_edit, allow_reviewer_push_back,
                allow_reviewer_feedback, reviewer_screen_mode, reviewer_guidelines
            )
            VALUES (
                $1, COALESCE($2, 'Active'), $3, $4, $5, $6, $7, $8, $9,
                COALESCE($10, FALSE), COALESCE($11, TRUE), COALESCE($12, TRUE),
                COALESCE($13, TRUE), COALESCE($14, 'full'), $15
            )
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.status)
        .bind(data.description)
        .bind(data.data_category)
        .bind(data.project_type)
        .bind(data.task_type)
        .bind(data.default_avg_task_time_minutes)
        .bind(data.review_time_minutes)
        .bind(data.max_users_per_task)
        .bind(data.auto_submit_task)
        .bind(data.allow_reviewer_edit)
        .bind(data.allow_reviewer_push_back)
        .bind(data.allow_reviewer_feedback)
        .bind(data.reviewer_screen_mode)
        .bind(data.reviewer_guidelines)
        .fetch_one(&mut *conn)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(project)
    }

    /// Finds a project by its unique name
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(project)
    }

    /// Lists all projects ordered by name
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY name ASC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(projects)
    }

    /// Updates the supplied fields of a project
    ///
    /// Returns None if the project doesn't exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                status = COALESCE($3, status),
                description = COALESCE($4, description),
                data_category = COALESCE($5, data_category),
                project_type = COALESCE($6, project_type),
                task_type = COALESCE($7, task_type),
                default_avg_task_time_minutes = COALESCE($8, default_avg_task_time_minutes),
                review_time_minutes = COALESCE($9, review_time_minutes),
                max_users_per_task = COALESCE($10, max_users_per_task),
                auto_submit_task = COALESCE($11, auto_submit_task),
                allow_reviewer_edit = COALESCE($12, allow_reviewer_edit),
                allow_reviewer_push_back = COALESCE($13, allow_reviewer_push_back),
                allow_reviewer_feedback = COALESCE($14, allow_reviewer_feedback),
                reviewer_screen_mode = COALESCE($15, reviewer_screen_mode),
                reviewer_guidelines = COALESCE($16, reviewer_guidelines)
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.status)
        .bind(data.description)
        .bind(data.data_category)
        .bind(data.project_type)
        .bind(data.task_type)
        .bind(data.default_avg_task_time_minutes)
        .bind(data.review_time_minutes)
        .bind(data.max_users_per_task)
        .bind(data.auto_submit_task)
        .bind(data.allow_reviewer_edit)
        .bind(data.allow_reviewer_push_back)
        .bind(data.allow_reviewer_feedback)
        .bind(data.reviewer_screen_mode)
        .bind(data.reviewer_guidelines)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(project)
    }

    /// Deletes a project; assignments and reviews cascade
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
