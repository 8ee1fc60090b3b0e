//! Task endpoints
//!
//! - `GET /tasks/dashboard` - The caller's own assignments, totals and reviews
//!
//! Admin only (gated by the router):
//!
//! - `POST|GET /tasks/admin/projects`, `GET|PUT|DELETE /tasks/admin/projects/:id`
//! - `GET /tasks/admin/users`
//! - `POST|GET /tasks/admin/assignments`, `DELETE /tasks/admin/assignments/:id`
//! - `POST /tasks/admin/reviews`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use dhriti_shared::{
    auth::middleware::AuthContext,
    dashboard::{self, TasksDashboard},
    models::{
        assignment::{AssignmentFilter, ProjectAssignment, UpsertAssignment},
        project::{CreateProject, Project, UpdateProject},
        review::{self, CreateReview, TaskReview},
        user::{User, UserSummary},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Project creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "Status must not be empty"))]
    pub status: Option<String>,

    pub description: Option<String>,
    pub data_category: Option<String>,
    pub project_type: Option<String>,
    pub task_type: Option<String>,

    #[validate(range(min = 1, message = "Average task time must be at least 1 minute"))]
    pub default_avg_task_time_minutes: Option<i32>,

    #[validate(range(min = 1, message = "Review time must be at least 1 minute"))]
    pub review_time_minutes: Option<i32>,

    #[validate(range(min = 1, message = "Max users per task must be at least 1"))]
    pub max_users_per_task: Option<i32>,

    pub auto_submit_task: Option<bool>,
    pub allow_reviewer_edit: Option<bool>,
    pub allow_reviewer_push_back: Option<bool>,
    pub allow_reviewer_feedback: Option<bool>,

    #[validate(length(min = 1, message = "Screen mode must not be empty"))]
    pub reviewer_screen_mode: Option<String>,

    pub reviewer_guidelines: Option<String>,
}

impl From<CreateProjectRequest> for CreateProject {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            name: req.name,
            status: req.status,
            description: req.description,
            data_category: req.data_category,
            project_type: req.project_type,
            task_type: req.task_type,
            default_avg_task_time_minutes: req.default_avg_task_time_minutes,
            review_time_minutes: req.review_time_minutes,
            max_users_per_task: req.max_users_per_task,
            auto_submit_task: req.auto_submit_task,
            allow_reviewer_edit: req.allow_reviewer_edit,
            allow_reviewer_push_back: req.allow_reviewer_push_back,
            allow_reviewer_feedback: req.allow_reviewer_feedback,
            reviewer_screen_mode: req.reviewer_screen_mode,
            reviewer_guidelines: req.reviewer_guidelines,
        }
    }
}

/// Partial project update; absent fields are left alone
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Status must not be empty"))]
    pub status: Option<String>,

    pub description: Option<String>,
    pub data_category: Option<String>,
    pub project_type: Option<String>,
    pub task_type: Option<String>,

    #[validate(range(min = 1, message = "Average task time must be at least 1 minute"))]
    pub default_avg_task_time_minutes: Option<i32>,

    #[validate(range(min = 1, message = "Review time must be at least 1 minute"))]
    pub review_time_minutes: Option<i32>,

    #[validate(range(min = 1, message = "Max users per task must be at least 1"))]
    pub max_users_per_task: Option<i32>,

    pub auto_submit_task: Option<bool>,
    pub allow_reviewer_edit: Option<bool>,
    pub allow_reviewer_push_back: Option<bool>,
    pub allow_reviewer_feedback: Option<bool>,

    #[validate(length(min = 1, message = "Screen mode must not be empty"))]
    pub reviewer_screen_mode: Option<String>,

    pub reviewer_guidelines: Option<String>,
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            name: req.name,
            status: req.status,
            description: req.description,
            data_category: req.data_category,
            project_type: req.project_type,
            task_type: req.task_type,
            default_avg_task_time_minutes: req.default_avg_task_time_minutes,
            review_time_minutes: req.review_time_minutes,
            max_users_per_task: req.max_users_per_task,
            auto_submit_task: req.auto_submit_task,
            allow_reviewer_edit: req.allow_reviewer_edit,
            allow_reviewer_push_back: req.allow_reviewer_push_back,
            allow_reviewer_feedback: req.allow_reviewer_feedback,
            reviewer_screen_mode: req.reviewer_screen_mode,
            reviewer_guidelines: req.reviewer_guidelines,
        }
    }
}

/// Assignment upsert request
#[derive(Debug, Deserialize, Validate)]
pub struct AssignmentRequest {
    pub user_id: i64,
    pub project_id: i64,

    #[validate(length(min = 1, message = "Status must not be empty"))]
    pub status: Option<String>,

    #[validate(range(min = 1, message = "Average task time must be at least 1 minute"))]
    pub avg_task_time_minutes: Option<i32>,

    #[validate(range(min = 0, message = "Completed tasks must not be negative"))]
    pub completed_tasks: Option<i32>,

    #[validate(range(min = 0, message = "Pending tasks must not be negative"))]
    pub pending_tasks: Option<i32>,
}

impl From<AssignmentRequest> for UpsertAssignment {
    fn from(req: AssignmentRequest) -> Self {
        Self {
            user_id: req.user_id,
            project_id: req.project_id,
            status: req.status,
            avg_task_time_minutes: req.avg_task_time_minutes,
            completed_tasks: req.completed_tasks,
            pending_tasks: req.pending_tasks,
        }
    }
}

/// Assignment as returned to admins
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub assignment_id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub status: String,
    pub avg_task_time_minutes: Option<i32>,
    pub completed_tasks: i32,
    pub pending_tasks: i32,
}

impl From<ProjectAssignment> for AssignmentResponse {
    fn from(a: ProjectAssignment) -> Self {
        Self {
            assignment_id: a.id,
            user_id: a.user_id,
            project_id: a.project_id,
            status: a.status,
            avg_task_time_minutes: a.avg_task_time_minutes,
            completed_tasks: a.completed_tasks,
            pending_tasks: a.pending_tasks,
        }
    }
}

/// Query filters for `GET /tasks/admin/assignments`
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentQuery {
    pub user_id: Option<i64>,
    pub project_id: Option<i64>,
}

/// Review creation request
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub user_id: i64,
    pub project_id: i64,

    /// Checked against [`review::validate_rating`]
    pub rating: f64,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// The caller's task dashboard
///
/// ```json
/// {
///   "stats": {"assigned_projects": 1, "tasks_completed": 5, "tasks_pending": 2, "avg_rating": 4.5},
///   "assignments": [{"assignment_id": 1, "project_name": "P1", "avg_task_time_label": "30 minutes", ...}],
///   "recent_reviews": [...]
/// }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: The token's user no longer exists
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TasksDashboard>> {
    let mut conn = state.db.acquire().await?;

    let view = dashboard::user_dashboard(&mut conn, &auth.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(view))
}

/// Create a project
///
/// # Errors
///
/// - `400 conflict`: Name already taken
/// - `422 validation_error`: Empty name or non-positive times
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    if Project::find_by_name(&mut tx, &req.name).await?.is_some() {
        return Err(ApiError::Conflict("Project name already exists".to_string()));
    }

    let project = Project::create(&mut tx, req.into()).await?;
    tx.commit().await?;

    tracing::info!(project_id = project.id, name = %project.name, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// List projects ordered by name
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(Project::list(&mut conn).await?))
}

/// Get one project
pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Project>> {
    let mut conn = state.db.acquire().await?;

    let project = Project::find_by_id(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Update the supplied fields of a project
///
/// # Errors
///
/// - `404 Not Found`: Unknown project
/// - `400 conflict`: Renamed to a taken name
pub async fn update_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    let project = Project::update(&mut tx, id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    tx.commit().await?;

    Ok(Json(project))
}

/// Delete a project together with its assignments and reviews
pub async fn delete_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;

    if !Project::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    tx.commit().await?;
    tracing::info!(project_id = id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Users with profile fields, ordered by email
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let mut conn = state.db.acquire().await?;
    Ok(Json(User::list_summaries(&mut conn).await?))
}

/// Create or update the assignment of a user to a project
///
/// A new pair starts with zero counts and the request status (else the
/// project's). An existing pair only changes the supplied fields, so
/// repeating a request never adds a row.
///
/// # Errors
///
/// - `404 Not Found`: Unknown user or project
/// - `422 validation_error`: Task time below 1 or negative counts
pub async fn upsert_assignment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    req.validate()?;

    let mut tx = state.db.begin().await?;

    User::find_by_id(&mut tx, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let project = Project::find_by_id(&mut tx, req.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let assignment = ProjectAssignment::upsert(&mut tx, req.into(), &project.status).await?;
    tx.commit().await?;

    Ok(Json(assignment.into()))
}

/// List assignments, optionally filtered by `user_id` and/or `project_id`
pub async fn list_assignments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AssignmentQuery>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let mut conn = state.db.acquire().await?;

    let assignments = ProjectAssignment::list(
        &mut conn,
        AssignmentFilter {
            user_id: query.user_id,
            project_id: query.project_id,
        },
    )
    .await?;

    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

/// Delete an assignment
pub async fn delete_assignment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;

    if !ProjectAssignment::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    tx.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a review of a user's work on a project
///
/// # Errors
///
/// - `404 Not Found`: Unknown user or project
/// - `422 validation_error`: Rating outside 0..=5
pub async fn create_review(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<TaskReview>)> {
    req.validate()?;
    review::validate_rating(req.rating).map_err(|msg| ApiError::invalid_field("rating", msg))?;

    let mut tx = state.db.begin().await?;

    User::find_by_id(&mut tx, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Project::find_by_id(&mut tx, req.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let review = TaskReview::create(
        &mut tx,
        CreateReview {
            user_id: req.user_id,
            project_id: req.project_id,
            rating: req.rating,
            comment: req.comment,
            created_at: None,
        },
    )
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(review)))
}
