use chrono::{DateTime, Utc};
use drydock_core::types::ClubId;
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
pub struct ScheduleCandidate {
    pub club_id: ClubId,
    pub last_success: Option<DateTime<Utc>>,
}

/// Every active club paired with its most recent successful scrape, if any.
pub async fn fetch_candidates(pool: &PgPool) -> Result<Vec<ScheduleCandidate>, sqlx::Error> {
    sqlx::query_as::<_, ScheduleCandidate>(
        r#"
        SELECT c.id AS club_id, MAX(sj.completed_at) AS last_success
        FROM clubs c
        LEFT JOIN scrape_jobs sj ON sj.club_id = c.id AND sj.status = 'completed'
        WHERE c.status = 'active'
        GROUP BY c.id
        "#,
    )
    .fetch_all(pool)
    .await
}
