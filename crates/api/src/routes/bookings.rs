//! `GET /bookings` (§4.5, public, tenant-scoped). Accepts either a single
//! `date`, or a `from`/`to` range capped at 31 days, optionally narrowed to
//! one `boat`.

use crate::AppState;
use crate::db::bookings;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use drydock_core::models::Booking;
use drydock_core::types::BoatId;
use drydock_core::error::FieldError;
use drydock_core::ValidationError;
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 500;
const MAX_RANGE_DAYS: i64 = 31;

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    boat: Option<BoatId>,
    limit: Option<i64>,
}

fn resolve_window(query: &ListBookingsQuery) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    if let Some(date) = query.date {
        return Ok((date, date));
    }

    match (query.from, query.to) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(ValidationError::single("from", "must not be after `to`"));
            }
            if (to - from).num_days() > MAX_RANGE_DAYS {
                return Err(ValidationError::single(
                    "to",
                    format!("range must not exceed {MAX_RANGE_DAYS} days"),
                ));
            }
            Ok((from, to))
        }
        (Some(_), None) | (None, Some(_)) => Err(ValidationError {
            fields: vec![FieldError::new("from", "`from` and `to` must both be provided")],
        }),
        (None, None) => {
            let today = chrono::Utc::now().date_naive();
            Ok((today, today))
        }
    }
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, ApiError> {
    let (from, to) = resolve_window(&query)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, DEFAULT_LIMIT);

    let bookings = bookings::list_in_range(&state.pool, club.id, from, to, query.boat, limit).await?;
    Ok(response::ok(bookings))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/bookings", get(list_bookings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_date_becomes_a_one_day_window() {
        let query = ListBookingsQuery { date: Some(date(2025, 1, 2)), from: None, to: None, boat: None, limit: None };
        let (from, to) = resolve_window(&query).unwrap();
        assert_eq!(from, to);
    }

    #[test]
    fn range_within_31_days_is_accepted() {
        let query = ListBookingsQuery {
            date: None,
            from: Some(date(2025, 1, 1)),
            to: Some(date(2025, 1, 1) + chrono::Duration::days(31)),
            boat: None,
            limit: None,
        };
        assert!(resolve_window(&query).is_ok());
    }

    #[test]
    fn range_over_31_days_is_rejected() {
        let query = ListBookingsQuery {
            date: None,
            from: Some(date(2025, 1, 1)),
            to: Some(date(2025, 1, 1) + chrono::Duration::days(32)),
            boat: None,
            limit: None,
        };
        assert!(resolve_window(&query).is_err());
    }

    #[test]
    fn from_without_to_is_rejected() {
        let query = ListBookingsQuery { date: None, from: Some(date(2025, 1, 1)), to: None, boat: None, limit: None };
        assert!(resolve_window(&query).is_err());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let query = ListBookingsQuery {
            date: None,
            from: Some(date(2025, 1, 10)),
            to: Some(date(2025, 1, 1)),
            boat: None,
            limit: None,
        };
        assert!(resolve_window(&query).is_err());
    }
}
