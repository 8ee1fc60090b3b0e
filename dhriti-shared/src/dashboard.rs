//! Dashboard aggregation
//!
//! Two read-only views over assignments, projects and reviews:
//!
//! - [`summary`]: platform-wide statistics for admins
//! - [`user_dashboard`]: the assignments, totals and recent reviews of one user
//!
//! Ratings are rounded to 2 decimals and task times to 1. Missing averages are
//! `None` in the per-user view and the [`NO_VALUE`] marker in the summary.

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::models::project::STATUS_ACTIVE;
use crate::models::review::{RecentReview, TaskReview};
use crate::models::user::User;

/// Placeholder rendered for trends and missing averages
pub const NO_VALUE: &str = "—";

/// Number of reviews listed on the user dashboard
pub const RECENT_REVIEWS_LIMIT: i64 = 5;

/// Value of a summary statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

/// One tile of the admin summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStat {
    pub id: String,
    pub label: String,
    pub value: StatValue,
    pub trend: Option<String>,
    pub icon: Option<String>,
}

impl DashboardStat {
    fn new(id: &str, label: &str, value: StatValue, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value,
            trend: Some(NO_VALUE.to_string()),
            icon: Some(icon.to_string()),
        }
    }
}

/// Admin summary response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub stats: Vec<DashboardStat>,
}

/// Raw totals behind the summary
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct SummaryTotals {
    pub active_projects: i64,
    pub tasks_completed: i64,
    pub tasks_pending: i64,
    pub total_assignments: i64,
    pub active_assignments: i64,
    pub avg_task_time: Option<f64>,
    pub total_users: i64,
}

impl SummaryTotals {
    /// Builds the stat tiles in display order
    pub fn into_summary(self) -> DashboardSummary {
        let avg_task_time = match self.avg_task_time {
            Some(avg) => StatValue::Decimal(round_to(avg, 1)),
            None => StatValue::Text(NO_VALUE.to_string()),
        };

        let stats = vec![
            DashboardStat::new(
                "activeProjects",
                "Total Active Projects",
                StatValue::Integer(self.active_projects),
                "📁",
            ),
            DashboardStat::new(
                "totalTasks",
                "Total Tasks",
                StatValue::Integer(self.tasks_completed + self.tasks_pending),
                "🧮",
            ),
            DashboardStat::new(
                "totalAssignments",
                "Total Assignments",
                StatValue::Integer(self.total_assignments),
                "👥",
            ),
            DashboardStat::new(
                "tasksPending",
                "Tasks Pending",
                StatValue::Integer(self.tasks_pending),
                "⏳",
            ),
            DashboardStat::new(
                "tasksCompleted",
                "Tasks Completed",
                StatValue::Integer(self.tasks_completed),
                "✅",
            ),
            DashboardStat::new(
                "activeAssignments",
                "Active Assignments",
                StatValue::Integer(self.active_assignments),
                "⚙️",
            ),
            DashboardStat::new("avgTaskTime", "Avg Task Time (min)", avg_task_time, "⏱️"),
            DashboardStat::new(
                "totalUsers",
                "Total Users",
                StatValue::Integer(self.total_users),
                "🧑‍🤝‍🧑",
            ),
        ];

        DashboardSummary { stats }
    }
}

/// One assignment row on the user dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedProject {
    pub assignment_id: i64,
    pub project_id: i64,
    pub project_name: String,
    pub avg_task_time_minutes: Option<i32>,
    pub avg_task_time_label: Option<String>,
    pub rating: Option<f64>,
    pub completed_tasks: i32,
    pub pending_tasks: i32,
    pub status: String,
}

/// Totals on the user dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksStats {
    pub assigned_projects: i64,
    pub tasks_completed: i64,
    pub tasks_pending: i64,
    pub avg_rating: Option<f64>,
}

/// Per-user dashboard response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksDashboard {
    pub stats: TasksStats,
    pub assignments: Vec<AssignedProject>,
    pub recent_reviews: Vec<RecentReview>,
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    assignment_id: i64,
    project_id: i64,
    project_name: String,
    assignment_minutes: Option<i32>,
    project_minutes: Option<i32>,
    avg_rating: Option<f64>,
    completed_tasks: i32,
    pending_tasks: i32,
    status: String,
}

impl From<AssignmentRow> for AssignedProject {
    fn from(row: AssignmentRow) -> Self {
        let minutes = effective_avg_minutes(row.assignment_minutes, row.project_minutes);

        Self {
            assignment_id: row.assignment_id,
            project_id: row.project_id,
            project_name: row.project_name,
            avg_task_time_minutes: minutes,
            avg_task_time_label: minutes.map(time_label),
            rating: row.avg_rating.map(|r| round_to(r, 2)),
            completed_tasks: row.completed_tasks,
            pending_tasks: row.pending_tasks,
            status: row.status,
        }
    }
}

/// Rounds to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Assignment override, else project default
pub fn effective_avg_minutes(assignment: Option<i32>, project_default: Option<i32>) -> Option<i32> {
    assignment.or(project_default)
}

/// Human label for a task time
pub fn time_label(minutes: i32) -> String {
    format!("{} minutes", minutes)
}

/// Computes the admin summary
///
/// Never fails on an empty database: counts are zero and the average task
/// time is the [`NO_VALUE`] marker.
pub async fn summary(conn: &mut PgConnection) -> Result<DashboardSummary, sqlx::Error> {
    let totals = sqlx::query_as::<_, SummaryTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM projects WHERE status = $1) AS active_projects,
            (SELECT COALESCE(SUM(completed_tasks), 0) FROM project_assignments) AS tasks_completed,
            (SELECT COALESCE(SUM(pending_tasks), 0) FROM project_assignments) AS tasks_pending,
            (SELECT COUNT(*) FROM project_assignments) AS total_assignments,
            (SELECT COUNT(*) FROM project_assignments WHERE status = $1) AS active_assignments,
            (SELECT AVG(avg_task_time_minutes)::FLOAT8 FROM project_assignments
                WHERE avg_task_time_minutes IS NOT NULL) AS avg_task_time,
            (SELECT COUNT(*) FROM users) AS total_users
        "#,
    )
    .bind(STATUS_ACTIVE)
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(?totals, "Computed dashboard totals");

    Ok(totals.into_summary())
}

/// Builds the dashboard of the user with the given email
///
/// Returns None if no such user exists.
pub async fn user_dashboard(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<TasksDashboard>, sqlx::Error> {
    let Some(user) = User::find_by_email(conn, email).await? else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT a.id AS assignment_id,
               p.id AS project_id,
               p.name AS project_name,
               a.avg_task_time_minutes AS assignment_minutes,
               p.default_avg_task_time_minutes AS project_minutes,
               r.avg_rating,
               a.completed_tasks,
               a.pending_tasks,
               a.status
        FROM project_assignments a
        JOIN projects p ON p.id = a.project_id
        LEFT JOIN (
            SELECT project_id, AVG(rating) AS avg_rating
            FROM task_reviews
            WHERE user_id = $1
            GROUP BY project_id
        ) r ON r.project_id = p.id
        WHERE a.user_id = $1
        ORDER BY p.name ASC
        "#,
    )
    .bind(user.id)
    .fetch_all(&mut *conn)
    .await?;

    let assignments: Vec<AssignedProject> = rows.into_iter().map(AssignedProject::from).collect();

    let stats = TasksStats {
        assigned_projects: assignments.len() as i64,
        tasks_completed: assignments.iter().map(|a| i64::from(a.completed_tasks)).sum(),
        tasks_pending: assignments.iter().map(|a| i64::from(a.pending_tasks)).sum(),
        avg_rating: TaskReview::average_for_user(conn, user.id)
            .await?
            .map(|r| round_to(r, 2)),
    };

    let recent_reviews = TaskReview::list_recent_for_user(conn, user.id, RECENT_REVIEWS_LIMIT).await?;

    Ok(Some(TasksDashboard {
        stats,
        assignments,
        recent_reviews,
    }))
}
