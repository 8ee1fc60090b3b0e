//! Task review model
//!
//! A review is a rating (0 to 5) and optional comment left against a user's
//! work on a project. Reviews feed the per-user dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Highest rating a review may carry
pub const MAX_RATING: f64 = 5.0;

/// Rejects ratings outside `0..=MAX_RATING`
pub fn validate_rating(rating: f64) -> Result<(), String> {
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(format!("Rating must be between 0 and {}", MAX_RATING));
    }

    Ok(())
}

/// Review row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskReview {
    pub id: i64,
    pub user_id: i64,
    pub project_id: i64,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub user_id: i64,
    pub project_id: i64,
    pub rating: f64,
    pub comment: Option<String>,

    /// Backdated timestamp; None means now
    pub created_at: Option<DateTime<Utc>>,
}

/// A review joined with its project name, as shown on the user dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentReview {
    pub id: i64,
    pub project_id: i64,
    pub project_name: String,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TaskReview {
    /// Inserts a review
    ///
    /// # Errors
    ///
    /// Returns a foreign key violation if the user or project doesn't exist.
    pub async fn create(conn: &mut PgConnection, data: CreateReview) -> Result<Self, sqlx::Error> {
        let review = sqlx::query_as::<_, TaskReview>(
            r#"
            INSERT INTO task_reviews (user_id, project_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING id, user_id, project_id, rating, comment, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.rating)
        .bind(data.comment)
        .bind(data.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(review)
    }

    /// Whether the user already has a review on the project with this comment
    pub async fn exists_with_comment(
        conn: &mut PgConnection,
        user_id: i64,
        project_id: i64,
        comment: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM task_reviews
                WHERE user_id = $1 AND project_id = $2
                  AND comment IS NOT DISTINCT FROM $3
            )
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .bind(comment)
        .fetch_one(&mut *conn)
        .await?;

        Ok(exists)
    }

    /// Latest reviews of a user, newest first
    pub async fn list_recent_for_user(
        conn: &mut PgConnection,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<RecentReview>, sqlx::Error> {
        let reviews = sqlx::query_as::<_, RecentReview>(
            r#"
            SELECT r.id, r.project_id, p.name AS project_name, r.rating, r.comment, r.created_at
            FROM task_reviews r
            JOIN projects p ON p.id = r.project_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(reviews)
    }

    /// Mean rating over all of a user's reviews, None if they have none
    pub async fn average_for_user(
        conn: &mut PgConnection,
        user_id: i64,
    ) -> Result<Option<f64>, sqlx::Error> {
        let (avg,): (Option<f64>,) =
            sqlx::query_as("SELECT AVG(rating) FROM task_reviews WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&mut *conn)
                .await?;

        Ok(avg)
    }

    /// Counts reviews of a user
    pub async fn count_for_user(conn: &mut PgConnection, user_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(4.7).is_ok());
        assert!(validate_rating(MAX_RATING).is_ok());

        assert_eq!(
            validate_rating(MAX_RATING + 0.1).unwrap_err(),
            "Rating must be between 0 and 5"
        );
        assert!(validate_rating(-1.0).is_err());
    }
}
