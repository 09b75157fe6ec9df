//! Persistence for one scrape: boat upsert with metadata merge, window-
//! replace of bookings, and `ScrapeJob` bookkeeping. Everything in
//! [`commit_scrape`] runs in a single transaction per club (§4.1 step 9/10).

use crate::parse::RawBoatCard;
use chrono::NaiveDate;
use drydock_core::boat_name::parse_boat_name;
use drydock_core::models::{Club, ScrapeJobStatus};
use drydock_core::types::{BoatId, ClubId, ScrapeJobId};
use sqlx::PgPool;
use std::collections::HashMap;

pub async fn load_club(pool: &PgPool, club_id: ClubId) -> Result<Club, sqlx::Error> {
    sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE id = $1")
        .bind(club_id)
        .fetch_one(pool)
        .await
}

/// Insert a `running` job row. It is updated to a terminal status by
/// [`finish_scrape_job`] once the scrape concludes.
pub async fn start_scrape_job(pool: &PgPool, club_id: ClubId) -> Result<ScrapeJobId, sqlx::Error> {
    let id = ScrapeJobId::new();
    sqlx::query(
        r#"
        INSERT INTO scrape_jobs (id, club_id, status, started_at)
        VALUES ($1, $2, 'running', now())
        "#,
    )
    .bind(id)
    .bind(club_id)
    .execute(pool)
    .await?;
    Ok(id)
}

#[allow(clippy::too_many_arguments)]
pub async fn finish_scrape_job(
    pool: &PgPool,
    job_id: ScrapeJobId,
    status: ScrapeJobStatus,
    duration_ms: i64,
    boats_count: i32,
    bookings_count: i32,
    error: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE scrape_jobs
        SET status = $2, completed_at = now(), duration_ms = $3,
            boats_count = $4, bookings_count = $5, error = $6
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .bind(status)
    .bind(duration_ms)
    .bind(boats_count)
    .bind(bookings_count)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}

/// One boat's fetched bookings, keyed by the date they fall on.
pub struct FetchedBoat {
    pub card: RawBoatCard,
    pub bookings_by_date: HashMap<NaiveDate, Vec<drydock_core::models::BookingSlot>>,
}

/// Upsert every boat and replace the booking window in one transaction.
/// Returns `(boats_count, bookings_count)`.
pub async fn commit_scrape(
    pool: &PgPool,
    club_id: ClubId,
    fetched: &[FetchedBoat],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<(i32, i32), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut boats_count = 0i32;
    let mut bookings_count = 0i32;
    let mut boat_ids = Vec::with_capacity(fetched.len());

    for boat in fetched {
        let parsed = parse_boat_name(&boat.card.display_name);
        let category = if parsed.is_tinnie { "tinnie" } else { "race" };

        // Only scrape-produced keys go in this object; anything else already
        // in `metadata` (manual `nickname` override, `image_url`, …) is left
        // untouched by the `||` merge below.
        let scraped_metadata = serde_json::json!({ "parsed_nickname": parsed.nickname });

        let boat_id: BoatId = sqlx::query_scalar(
            r#"
            INSERT INTO boats (id, club_id, source_id, name, boat_type, boat_category,
                                classification, weight_kg, metadata, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            ON CONFLICT (club_id, source_id) DO UPDATE SET
                name = excluded.name,
                boat_type = excluded.boat_type,
                boat_category = excluded.boat_category,
                classification = excluded.classification,
                weight_kg = excluded.weight_kg,
                metadata = boats.metadata || excluded.metadata,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(BoatId::new())
        .bind(club_id)
        .bind(&boat.card.source_id)
        .bind(&parsed.name)
        .bind(&parsed.boat_type)
        .bind(category)
        .bind(&parsed.classification)
        .bind(parsed.weight_kg)
        .bind(scraped_metadata)
        .fetch_one(&mut *tx)
        .await?;

        boats_count += 1;
        boat_ids.push(boat_id);
    }

    // Window-replace: delete every booking row in range for boats touched by
    // this scrape, then insert the freshly fetched set.
    sqlx::query(
        r#"
        DELETE FROM bookings
        WHERE club_id = $1 AND boat_id = ANY($2) AND booking_date BETWEEN $3 AND $4
        "#,
    )
    .bind(club_id)
    .bind(&boat_ids)
    .bind(window_start)
    .bind(window_end)
    .execute(&mut *tx)
    .await?;

    for (boat, boat_id) in fetched.iter().zip(&boat_ids) {
        for (date, slots) in &boat.bookings_by_date {
            if *date < window_start || *date > window_end || slots.is_empty() {
                continue;
            }
            bookings_count += i32::try_from(slots.len()).unwrap_or(i32::MAX);

            sqlx::query(
                r#"
                INSERT INTO bookings (id, club_id, boat_id, booking_date, bookings)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(drydock_core::types::BookingId::new())
            .bind(club_id)
            .bind(boat_id)
            .bind(date)
            .bind(serde_json::to_value(slots).unwrap_or(serde_json::Value::Null))
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok((boats_count, bookings_count))
}
