use chrono::NaiveDate;
use drydock_core::models::Booking;
use drydock_core::types::{BoatId, ClubId};
use sqlx::PgPool;

/// Bookings intersecting `[from, to]`, optionally narrowed to one boat.
/// `from == to` covers the single-date query shape the public route exposes.
pub async fn list_in_range(
    pool: &PgPool,
    club_id: ClubId,
    from: NaiveDate,
    to: NaiveDate,
    boat_id: Option<BoatId>,
    limit: i64,
) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE club_id = $1
          AND booking_date BETWEEN $2 AND $3
          AND ($4::uuid IS NULL OR boat_id = $4)
        ORDER BY booking_date ASC
        LIMIT $5
        "#,
    )
    .bind(club_id)
    .bind(from)
    .bind(to)
    .bind(boat_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
