//! Database-backed tests for models and dashboard aggregation

use dhriti_shared::dashboard::{self, StatValue, NO_VALUE};
use dhriti_shared::models::assignment::{AssignmentFilter, ProjectAssignment, UpsertAssignment};
use dhriti_shared::models::profile::{UpdateProfile, UserProfile};
use dhriti_shared::models::project::{CreateProject, Project, UpdateProject};
use dhriti_shared::models::review::{CreateReview, TaskReview};
use dhriti_shared::models::user::{CreateUser, UpdateUser, User, UserRole};
use sqlx::PgPool;

async fn insert_user(pool: &PgPool, email: &str) -> User {
    let mut conn = pool.acquire().await.unwrap();
    User::create(
        &mut conn,
        CreateUser {
            email: email.to_string(),
            hashed_password: "$argon2id$placeholder".to_string(),
            role: UserRole::User,
        },
    )
    .await
    .unwrap()
}

async fn insert_project(pool: &PgPool, name: &str, default_minutes: Option<i32>) -> Project {
    let mut conn = pool.acquire().await.unwrap();
    Project::create(
        &mut conn,
        CreateProject {
            name: name.to_string(),
            default_avg_task_time_minutes: default_minutes,
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

#[sqlx::test(migrations = "../migrations")]
async fn test_duplicate_email_is_unique_violation(pool: PgPool) -> sqlx::Result<()> {
    insert_user(&pool, "dup@example.com").await;

    let mut conn = pool.acquire().await?;
    let err = User::create(
        &mut conn,
        CreateUser {
            email: "dup@example.com".to_string(),
            hashed_password: "x".to_string(),
            role: UserRole::Admin,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert!(db_err.is_unique_violation());
    assert_eq!(db_err.constraint(), Some("users_email_key"));

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_user_update_changes_only_role(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "role@example.com").await;
    let mut conn = pool.acquire().await?;

    let updated = User::update(
        &mut conn,
        user.id,
        UpdateUser {
            role: Some(UserRole::Admin),
            ..Default::default()
        },
    )
    .await?
    .expect("user exists");

    assert_eq!(updated.role, UserRole::Admin);
    assert_eq!(updated.hashed_password, user.hashed_password);

    assert!(User::update(&mut conn, user.id + 1000, UpdateUser::default())
        .await?
        .is_none());

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_profile_created_lazily_with_email_name(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "lazy@example.com").await;
    let mut conn = pool.acquire().await?;

    let none = UserProfile::apply_update(&mut conn, user.id, &user.email, UpdateProfile::default())
        .await?;
    assert!(none.is_none());

    let blank = UserProfile::apply_update(
        &mut conn,
        user.id,
        &user.email,
        UpdateProfile {
            name: Some(String::new()),
            status: Some(String::new()),
            ..Default::default()
        },
    )
    .await?;
    assert!(blank.is_none());
    assert!(UserProfile::find_by_user_id(&mut conn, user.id).await?.is_none());

    let profile = UserProfile::apply_update(
        &mut conn,
        user.id,
        &user.email,
        UpdateProfile {
            phone: Some("555-0100".to_string()),
            ..Default::default()
        },
    )
    .await?
    .expect("profile created");

    assert_eq!(profile.name, "lazy@example.com");
    assert_eq!(profile.status, "Active");
    assert_eq!(profile.phone.as_deref(), Some("555-0100"));

    let renamed = UserProfile::apply_update(
        &mut conn,
        user.id,
        &user.email,
        UpdateProfile {
            name: Some("Lazy Larry".to_string()),
            ..Default::default()
        },
    )
    .await?
    .expect("profile exists");

    assert_eq!(renamed.id, profile.id);
    assert_eq!(renamed.name, "Lazy Larry");
    assert_eq!(renamed.phone.as_deref(), Some("555-0100"));

    let summary = User::find_summary(&mut conn, user.id).await?.expect("user exists");
    assert_eq!(summary.name.as_deref(), Some("Lazy Larry"));

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_project_update_is_partial(pool: PgPool) -> sqlx::Result<()> {
    let project = insert_project(&pool, "Partial", Some(30)).await;
    assert_eq!(project.status, "Active");
    assert_eq!(project.reviewer_screen_mode, "full");
    assert!(!project.auto_submit_task);
    assert!(project.allow_reviewer_edit);

    let mut conn = pool.acquire().await?;
    let updated = Project::update(
        &mut conn,
        project.id,
        UpdateProject {
            status: Some("Paused".to_string()),
            auto_submit_task: Some(true),
            ..Default::default()
        },
    )
    .await?
    .expect("project exists");

    assert_eq!(updated.name, "Partial");
    assert_eq!(updated.status, "Paused");
    assert_eq!(updated.default_avg_task_time_minutes, Some(30));
    assert!(updated.auto_submit_task);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_assignment_upsert_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "u1@example.com").await;
    let project = insert_project(&pool, "P1", None).await;
    let mut conn = pool.acquire().await?;

    let payload = UpsertAssignment {
        user_id: user.id,
        project_id: project.id,
        completed_tasks: Some(5),
        pending_tasks: Some(2),
        ..Default::default()
    };

    let first = ProjectAssignment::upsert(&mut conn, payload.clone(), &project.status).await?;
    let second = ProjectAssignment::upsert(&mut conn, payload, &project.status).await?;

    assert_eq!(first.id, second.id);
    assert_eq!(second.completed_tasks, 5);
    assert_eq!(second.pending_tasks, 2);
    assert_eq!(second.status, "Active");
    assert_eq!(
        ProjectAssignment::count_for_pair(&mut conn, user.id, project.id).await?,
        1
    );

    let partial = ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: project.id,
            pending_tasks: Some(0),
            ..Default::default()
        },
        &project.status,
    )
    .await?;

    assert_eq!(partial.completed_tasks, 5);
    assert_eq!(partial.pending_tasks, 0);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_new_assignment_takes_project_status(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "paused@example.com").await;
    let mut conn = pool.acquire().await?;
    let project = Project::create(
        &mut conn,
        CreateProject {
            name: "Paused Project".to_string(),
            status: Some("Paused".to_string()),
            ..Default::default()
        },
    )
    .await?;

    let assignment = ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: project.id,
            ..Default::default()
        },
        &project.status,
    )
    .await?;

    assert_eq!(assignment.status, "Paused");
    assert_eq!(assignment.completed_tasks, 0);
    assert_eq!(assignment.pending_tasks, 0);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_assignment_list_filters(pool: PgPool) -> sqlx::Result<()> {
    let alice = insert_user(&pool, "alice@example.com").await;
    let bob = insert_user(&pool, "bob@example.com").await;
    let p1 = insert_project(&pool, "P1", None).await;
    let p2 = insert_project(&pool, "P2", None).await;
    let mut conn = pool.acquire().await?;

    for (user_id, project_id) in [(alice.id, p1.id), (alice.id, p2.id), (bob.id, p1.id)] {
        ProjectAssignment::upsert(
            &mut conn,
            UpsertAssignment {
                user_id,
                project_id,
                ..Default::default()
            },
            "Active",
        )
        .await?;
    }

    let all = ProjectAssignment::list(&mut conn, AssignmentFilter::default()).await?;
    assert_eq!(all.len(), 3);

    let alices = ProjectAssignment::list(
        &mut conn,
        AssignmentFilter {
            user_id: Some(alice.id),
            project_id: None,
        },
    )
    .await?;
    assert_eq!(alices.len(), 2);
    assert!(alices.iter().all(|a| a.user_id == alice.id));

    let pair = ProjectAssignment::list(
        &mut conn,
        AssignmentFilter {
            user_id: Some(bob.id),
            project_id: Some(p1.id),
        },
    )
    .await?;
    assert_eq!(pair.len(), 1);

    assert!(ProjectAssignment::delete(&mut conn, pair[0].id).await?);
    assert!(!ProjectAssignment::delete(&mut conn, pair[0].id).await?);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_deleting_user_cascades(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "gone@example.com").await;
    let project = insert_project(&pool, "Cascade", None).await;
    let mut conn = pool.acquire().await?;

    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: project.id,
            ..Default::default()
        },
        &project.status,
    )
    .await?;
    TaskReview::create(
        &mut conn,
        CreateReview {
            user_id: user.id,
            project_id: project.id,
            rating: 4.5,
            comment: Some("Good".to_string()),
            created_at: None,
        },
    )
    .await?;

    assert!(User::delete(&mut conn, user.id).await?);

    assert_eq!(
        ProjectAssignment::count_for_pair(&mut conn, user.id, project.id).await?,
        0
    );
    assert_eq!(TaskReview::count_for_user(&mut conn, user.id).await?, 0);
    assert!(Project::find_by_id(&mut conn, project.id).await?.is_some());

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_review_exists_with_comment(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "rev@example.com").await;
    let project = insert_project(&pool, "Reviewed", None).await;
    let mut conn = pool.acquire().await?;

    assert!(!TaskReview::exists_with_comment(&mut conn, user.id, project.id, Some("Nice")).await?);

    TaskReview::create(
        &mut conn,
        CreateReview {
            user_id: user.id,
            project_id: project.id,
            rating: 5.0,
            comment: Some("Nice".to_string()),
            created_at: None,
        },
    )
    .await?;

    assert!(TaskReview::exists_with_comment(&mut conn, user.id, project.id, Some("Nice")).await?);
    assert!(!TaskReview::exists_with_comment(&mut conn, user.id, project.id, None).await?);

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_summary_on_empty_database(pool: PgPool) -> sqlx::Result<()> {
    let mut conn = pool.acquire().await?;
    let summary = dashboard::summary(&mut conn).await?;

    assert_eq!(summary.stats.len(), 8);
    for stat in &summary.stats {
        match stat.id.as_str() {
            "avgTaskTime" => assert_eq!(stat.value, StatValue::Text(NO_VALUE.to_string())),
            _ => assert_eq!(stat.value, StatValue::Integer(0), "stat {}", stat.id),
        }
    }

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_summary_counts(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "sum@example.com").await;
    let active = insert_project(&pool, "Active One", None).await;
    let mut conn = pool.acquire().await?;
    let paused = Project::create(
        &mut conn,
        CreateProject {
            name: "Paused One".to_string(),
            status: Some("Paused".to_string()),
            ..Default::default()
        },
    )
    .await?;

    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: active.id,
            avg_task_time_minutes: Some(10),
            completed_tasks: Some(5),
            pending_tasks: Some(2),
            ..Default::default()
        },
        &active.status,
    )
    .await?;
    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: paused.id,
            avg_task_time_minutes: Some(15),
            completed_tasks: Some(1),
            ..Default::default()
        },
        &paused.status,
    )
    .await?;

    let summary = dashboard::summary(&mut conn).await?;
    let value = |id: &str| {
        summary
            .stats
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.value.clone())
            .unwrap()
    };

    assert_eq!(value("activeProjects"), StatValue::Integer(1));
    assert_eq!(value("totalTasks"), StatValue::Integer(8));
    assert_eq!(value("tasksCompleted"), StatValue::Integer(6));
    assert_eq!(value("tasksPending"), StatValue::Integer(2));
    assert_eq!(value("totalAssignments"), StatValue::Integer(2));
    assert_eq!(value("activeAssignments"), StatValue::Integer(1));
    assert_eq!(value("avgTaskTime"), StatValue::Decimal(12.5));
    assert_eq!(value("totalUsers"), StatValue::Integer(1));

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_user_dashboard(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "dash@example.com").await;
    let p1 = insert_project(&pool, "P1", Some(30)).await;
    let p2 = insert_project(&pool, "P2", None).await;
    let mut conn = pool.acquire().await?;

    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: p1.id,
            completed_tasks: Some(5),
            pending_tasks: Some(2),
            ..Default::default()
        },
        &p1.status,
    )
    .await?;
    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: p2.id,
            ..Default::default()
        },
        &p2.status,
    )
    .await?;

    for rating in [4.0, 5.0, 4.5] {
        TaskReview::create(
            &mut conn,
            CreateReview {
                user_id: user.id,
                project_id: p1.id,
                rating,
                comment: None,
                created_at: None,
            },
        )
        .await?;
    }

    let view = dashboard::user_dashboard(&mut conn, "dash@example.com")
        .await?
        .expect("user exists");

    assert_eq!(view.stats.assigned_projects, 2);
    assert_eq!(view.stats.tasks_completed, 5);
    assert_eq!(view.stats.tasks_pending, 2);
    assert_eq!(view.stats.avg_rating, Some(4.5));

    let first = &view.assignments[0];
    assert_eq!(first.project_name, "P1");
    assert_eq!(first.avg_task_time_minutes, Some(30));
    assert_eq!(first.avg_task_time_label.as_deref(), Some("30 minutes"));
    assert_eq!(first.rating, Some(4.5));

    let second = &view.assignments[1];
    assert_eq!(second.project_name, "P2");
    assert_eq!(second.avg_task_time_minutes, None);
    assert_eq!(second.avg_task_time_label, None);
    assert_eq!(second.rating, None);

    assert_eq!(view.recent_reviews.len(), 3);
    assert!(view.recent_reviews.iter().all(|r| r.project_name == "P1"));

    assert!(dashboard::user_dashboard(&mut conn, "nobody@example.com")
        .await?
        .is_none());

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_recent_reviews_are_newest_five(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "recent@example.com").await;
    let project = insert_project(&pool, "Recent", None).await;
    let mut conn = pool.acquire().await?;

    let now = chrono::Utc::now();
    // inserted oldest last so insertion order and age disagree
    for days in [1, 2, 3, 4, 5, 6] {
        TaskReview::create(
            &mut conn,
            CreateReview {
                user_id: user.id,
                project_id: project.id,
                rating: 4.0,
                comment: Some(format!("{} days ago", days)),
                created_at: Some(now - chrono::Duration::days(days)),
            },
        )
        .await?;
    }

    let view = dashboard::user_dashboard(&mut conn, "recent@example.com")
        .await?
        .expect("user exists");

    let comments: Vec<&str> = view
        .recent_reviews
        .iter()
        .filter_map(|r| r.comment.as_deref())
        .collect();
    assert_eq!(
        comments,
        vec!["1 days ago", "2 days ago", "3 days ago", "4 days ago", "5 days ago"]
    );
    assert!(view
        .recent_reviews
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));

    Ok(())
}

#[sqlx::test(migrations = "../migrations")]
async fn test_assignment_time_overrides_project_default(pool: PgPool) -> sqlx::Result<()> {
    let user = insert_user(&pool, "override@example.com").await;
    let project = insert_project(&pool, "Override", Some(30)).await;
    let mut conn = pool.acquire().await?;

    ProjectAssignment::upsert(
        &mut conn,
        UpsertAssignment {
            user_id: user.id,
            project_id: project.id,
            avg_task_time_minutes: Some(45),
            ..Default::default()
        },
        &project.status,
    )
    .await?;

    let view = dashboard::user_dashboard(&mut conn, "override@example.com")
        .await?
        .expect("user exists");

    let row = &view.assignments[0];
    assert_eq!(row.avg_task_time_minutes, Some(45));
    assert_eq!(row.avg_task_time_label.as_deref(), Some("45 minutes"));

    Ok(())
}
