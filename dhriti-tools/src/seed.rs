//! Sample data for local development
//!
//! Creates one annotator account with three projects, an assignment per
//! project and a few reviews. Safe to run repeatedly: existing rows are
//! reused, assignment counts are reset to the sample values and reviews with
//! the same user, project and comment are skipped.

use chrono::{Duration, Utc};
use dhriti_shared::{
    auth::password,
    models::{
        assignment::{ProjectAssignment, UpsertAssignment},
        project::{CreateProject, Project},
        review::{CreateReview, TaskReview},
        user::{CreateUser, User, UserRole},
    },
};
use sqlx::{PgConnection, PgPool};

/// Login of the sample account
pub const SAMPLE_EMAIL: &str = "alice@example.com";

/// Password of the sample account
pub const SAMPLE_PASSWORD: &str = "password123";

/// One sample project with the sample user's stats on it
#[derive(Debug, Clone, Copy)]
pub struct SampleProject {
    pub name: &'static str,
    pub status: &'static str,
    pub avg_task_time_minutes: i32,
    pub completed_tasks: i32,
    pub pending_tasks: i32,
    pub reviews: &'static [(f64, &'static str)],
}

pub const SAMPLE_PROJECTS: [SampleProject; 3] = [
    SampleProject {
        name: "BinPref_Prod_PortugueseBP2",
        status: "Active",
        avg_task_time_minutes: 30,
        completed_tasks: 466,
        pending_tasks: 0,
        reviews: &[(4.8, "Consistent quality."), (4.6, "Great attention to detail.")],
    },
    SampleProject {
        name: "VisionTag_EN_v3",
        status: "Paused",
        avg_task_time_minutes: 12,
        completed_tasks: 1220,
        pending_tasks: 34,
        reviews: &[(4.7, "Solid performance.")],
    },
    SampleProject {
        name: "ASR_Hindi_Release",
        status: "Active",
        avg_task_time_minutes: 18,
        completed_tasks: 809,
        pending_tasks: 12,
        reviews: &[],
    },
];

/// What a seed run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub user_id: i64,
    pub user_created: bool,
    pub projects_created: usize,
    pub assignments: usize,
    pub reviews_created: usize,
}

/// Seeds the sample data in one transaction
pub async fn seed(pool: &PgPool) -> anyhow::Result<SeedReport> {
    let mut tx = pool.begin().await?;

    let (user, user_created) = get_or_create_user(&mut tx).await?;
    let mut report = SeedReport {
        user_id: user.id,
        user_created,
        ..Default::default()
    };

    for (index, sample) in SAMPLE_PROJECTS.iter().enumerate() {
        seed_project(&mut tx, &user, index, sample, &mut report).await?;
    }

    tx.commit().await?;

    tracing::info!(?report, "Seed complete");
    Ok(report)
}

async fn get_or_create_user(conn: &mut PgConnection) -> anyhow::Result<(User, bool)> {
    if let Some(user) = User::find_by_email(conn, SAMPLE_EMAIL).await? {
        tracing::debug!(user_id = user.id, "Sample user already exists");
        return Ok((user, false));
    }

    let user = User::create(
        conn,
        CreateUser {
            email: SAMPLE_EMAIL.to_string(),
            hashed_password: password::hash_password(SAMPLE_PASSWORD)?,
            role: UserRole::User,
        },
    )
    .await?;

    Ok((user, true))
}

async fn seed_project(
    conn: &mut PgConnection,
    user: &User,
    index: usize,
    sample: &SampleProject,
    report: &mut SeedReport,
) -> anyhow::Result<()> {
    let project = match Project::find_by_name(conn, sample.name).await? {
        Some(project) => project,
        None => {
            report.projects_created += 1;
            Project::create(
                conn,
                CreateProject {
                    name: sample.name.to_string(),
                    status: Some(sample.status.to_string()),
                    default_avg_task_time_minutes: Some(sample.avg_task_time_minutes),
                    ..Default::default()
                },
            )
            .await?
        }
    };

    ProjectAssignment::upsert(
        conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: project.id,
            status: Some(sample.status.to_string()),
            avg_task_time_minutes: Some(sample.avg_task_time_minutes),
            completed_tasks: Some(sample.completed_tasks),
            pending_tasks: Some(sample.pending_tasks),
        },
        &project.status,
    )
    .await?;
    report.assignments += 1;

    // older projects get older reviews, spaced a few hours apart
    let base = Utc::now() - Duration::days(review_age_days(index));

    for (offset, (rating, comment)) in sample.reviews.iter().enumerate() {
        if TaskReview::exists_with_comment(conn, user.id, project.id, Some(*comment)).await? {
            continue;
        }

        TaskReview::create(
            conn,
            CreateReview {
                user_id: user.id,
                project_id: project.id,
                rating: *rating,
                comment: Some(comment.to_string()),
                created_at: Some(base + Duration::hours(6 * offset as i64)),
            },
        )
        .await?;
        report.reviews_created += 1;
    }

    Ok(())
}

/// Age in days of the first review of the `index`-th sample project
fn review_age_days(index: usize) -> i64 {
    7 - 2 * index as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_age_days() {
        assert_eq!(review_age_days(0), 7);
        assert_eq!(review_age_days(1), 5);
        assert_eq!(review_age_days(2), 3);
    }

    #[test]
    fn test_sample_projects_are_distinct() {
        let mut names: Vec<&str> = SAMPLE_PROJECTS.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SAMPLE_PROJECTS.len());
    }

    #[test]
    fn test_sample_ratings_in_range() {
        for project in SAMPLE_PROJECTS {
            for (rating, _) in project.reviews {
                assert!((0.0..=dhriti_shared::models::review::MAX_RATING).contains(rating));
            }
        }
    }
}
