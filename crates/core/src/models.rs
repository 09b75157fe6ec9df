//! Core domain models
//!
//! These models represent the core business entities and map to database tables.
//! Every table carries a `club_id`; callers are responsible for including it in
//! every predicate (see `ClubId` in [`crate::types`]).

use crate::types::{BoatId, BookingId, ClubId, ScrapeJobId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A subscribing rowing club: the unit of tenancy.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    pub subdomain: String,
    pub custom_domain: Option<String>,
    pub status: ClubStatus,
    pub data_source_type: String,
    #[sqlx(json)]
    pub data_source_config: serde_json::Value,
    #[sqlx(json)]
    pub branding: serde_json::Value,
    #[sqlx(json)]
    pub display_config: serde_json::Value,
    #[sqlx(json)]
    pub tv_display_config: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Club lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "club_status", rename_all = "lowercase")]
pub enum ClubStatus {
    Active,
    Suspended,
    Trial,
}

/// An admin user scoped to exactly one club.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub club_id: ClubId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// Admin role. `SuperAdmin` is reserved for platform operators; every route in
/// this service only ever checks tenant membership, never role, per the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    ClubAdmin,
    SuperAdmin,
}

/// A rowing shell listed by the club's upstream booking provider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Boat {
    pub id: BoatId,
    pub club_id: ClubId,
    pub source_id: String,
    pub name: String,
    pub boat_type: String,
    pub boat_category: BoatCategory,
    pub classification: Option<String>,
    pub weight_kg: Option<i32>,
    pub is_damaged: bool,
    pub damaged_reason: Option<String>,
    #[sqlx(json)]
    pub metadata: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Race shells and social/training ("tinnie") shells sort and display differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "boat_category", rename_all = "lowercase")]
pub enum BoatCategory {
    Race,
    Tinnie,
}

/// The set of bookings for one boat on one date, as scraped from upstream.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: BookingId,
    pub club_id: ClubId,
    pub boat_id: BoatId,
    pub booking_date: NaiveDate,
    pub session_name: Option<String>,
    #[sqlx(json)]
    pub bookings: serde_json::Value,
}

/// One entry inside `Booking.bookings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingSlot {
    pub start_time: String,
    pub end_time: String,
    pub member_name: String,
}

/// An append-only record of one scrape attempt for one club.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScrapeJob {
    pub id: ScrapeJobId,
    pub club_id: ClubId,
    pub status: ScrapeJobStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub boats_count: i32,
    pub bookings_count: i32,
    pub error: Option<String>,
}

/// Terminal and in-flight states of a [`ScrapeJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scrape_job_status", rename_all = "lowercase")]
pub enum ScrapeJobStatus {
    Running,
    Completed,
    Failed,
}
