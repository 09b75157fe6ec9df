use chrono::{DateTime, Utc};
use drydock_core::models::ScrapeJob;
use drydock_core::types::ClubId;
use sqlx::{FromRow, PgPool};

pub async fn list_recent(pool: &PgPool, club_id: ClubId, limit: i64) -> Result<Vec<ScrapeJob>, sqlx::Error> {
    sqlx::query_as::<_, ScrapeJob>(
        "SELECT * FROM scrape_jobs WHERE club_id = $1 ORDER BY started_at DESC LIMIT $2",
    )
    .bind(club_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

#[derive(Debug, FromRow)]
pub struct DaySummary {
    pub success_count: i64,
    pub fail_count: i64,
    pub avg_duration_ms: Option<f64>,
}

pub async fn summarize_last_24h(pool: &PgPool, club_id: ClubId, since: DateTime<Utc>) -> Result<DaySummary, sqlx::Error> {
    sqlx::query_as::<_, DaySummary>(
        r#"
        SELECT
            count(*) FILTER (WHERE status = 'completed') AS success_count,
            count(*) FILTER (WHERE status = 'failed') AS fail_count,
            avg(duration_ms) FILTER (WHERE status = 'completed') AS avg_duration_ms
        FROM scrape_jobs
        WHERE club_id = $1 AND started_at >= $2
        "#,
    )
    .bind(club_id)
    .bind(since)
    .fetch_one(pool)
    .await
}
