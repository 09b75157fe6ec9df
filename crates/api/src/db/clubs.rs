//! Tenant resolution and admin club reads. Every query here is the one place
//! allowed to look a club up by something other than its id.

use drydock_core::models::Club;
use drydock_core::types::ClubId;
use sqlx::PgPool;

pub async fn find_by_custom_domain(pool: &PgPool, host: &str) -> Result<Option<Club>, sqlx::Error> {
    sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE custom_domain = $1 AND status = 'active'")
        .bind(host)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_subdomain(pool: &PgPool, subdomain: &str) -> Result<Option<Club>, sqlx::Error> {
    sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE subdomain = $1 AND status = 'active'")
        .bind(subdomain)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, club_id: ClubId) -> Result<Option<Club>, sqlx::Error> {
    sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE id = $1")
        .bind(club_id)
        .fetch_optional(pool)
        .await
}

/// Idempotent: a club with this subdomain is returned as-is rather than
/// duplicated, so provisioning scripts can be re-run safely.
pub async fn create_club(pool: &PgPool, name: &str, subdomain: &str) -> Result<Club, sqlx::Error> {
    if let Some(existing) =
        sqlx::query_as::<_, Club>("SELECT * FROM clubs WHERE subdomain = $1")
            .bind(subdomain)
            .fetch_optional(pool)
            .await?
    {
        return Ok(existing);
    }

    sqlx::query_as::<_, Club>(
        "INSERT INTO clubs (id, name, subdomain, status) VALUES ($1, $2, $3, 'active') RETURNING *",
    )
    .bind(ClubId::new())
    .bind(name)
    .bind(subdomain)
    .fetch_one(pool)
    .await
}

pub async fn update_data_source_config(
    pool: &PgPool,
    club_id: ClubId,
    config: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE clubs SET data_source_config = $1, updated_at = now() WHERE id = $2")
        .bind(config)
        .bind(club_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_display_config(
    pool: &PgPool,
    club_id: ClubId,
    display_config: &serde_json::Value,
    branding: &serde_json::Value,
    tv_display_config: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE clubs SET display_config = $1, branding = $2, tv_display_config = $3, updated_at = now() WHERE id = $4",
    )
    .bind(display_config)
    .bind(branding)
    .bind(tv_display_config)
    .bind(club_id)
    .execute(pool)
    .await?;
    Ok(())
}
