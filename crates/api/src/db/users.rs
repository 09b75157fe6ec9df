//! Admin user lookups. Every query is scoped to a club except
//! [`find_by_id`], which the token-verification middleware uses after
//! already having a token-embedded `club_id` to check against.

use drydock_core::models::User;
use drydock_core::types::{ClubId, UserId};
use sqlx::PgPool;

pub async fn find_by_id(pool: &PgPool, user_id: UserId) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, club_id: ClubId, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE club_id = $1 AND lower(email) = lower($2)")
        .bind(club_id)
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Idempotent: re-running provisioning against an existing `(club_id, email)`
/// returns the existing user rather than failing the unique constraint.
pub async fn create_admin(
    pool: &PgPool,
    club_id: ClubId,
    email: &str,
    password_hash: &str,
    full_name: &str,
) -> Result<User, sqlx::Error> {
    if let Some(existing) = find_by_email(pool, club_id, email).await? {
        return Ok(existing);
    }

    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, club_id, email, password_hash, full_name, role) \
         VALUES ($1, $2, $3, $4, $5, 'club_admin') RETURNING *",
    )
    .bind(UserId::new())
    .bind(club_id)
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .fetch_one(pool)
    .await
}

pub async fn update_password_hash(pool: &PgPool, user_id: UserId, new_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
