use drydock_core::models::Boat;
use drydock_core::types::{BoatId, ClubId};
use sqlx::PgPool;

pub async fn list(pool: &PgPool, club_id: ClubId, limit: i64, offset: i64) -> Result<Vec<Boat>, sqlx::Error> {
    sqlx::query_as::<_, Boat>(
        "SELECT * FROM boats WHERE club_id = $1 ORDER BY name ASC LIMIT $2 OFFSET $3",
    )
    .bind(club_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// `club_id` is part of the predicate so a boat belonging to another tenant
/// comes back as `None`, never as a row the caller has to reject by hand.
pub async fn find_by_id(pool: &PgPool, club_id: ClubId, boat_id: BoatId) -> Result<Option<Boat>, sqlx::Error> {
    sqlx::query_as::<_, Boat>("SELECT * FROM boats WHERE club_id = $1 AND id = $2")
        .bind(club_id)
        .bind(boat_id)
        .fetch_optional(pool)
        .await
}
