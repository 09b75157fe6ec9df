//! `GET /boats`, `GET /boats/{id}` (§4.5, public, tenant-scoped only).

use crate::AppState;
use crate::db::boats;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use drydock_core::models::Boat;
use drydock_core::types::BoatId;
use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ListBoatsQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_boats(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Query(query): Query<ListBoatsQuery>,
) -> Result<Json<ApiResponse<Vec<Boat>>>, ApiError> {
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(drydock_core::ValidationError::single("offset", "must not be negative").into());
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let boats = boats::list(&state.pool, club.id, limit, offset).await?;
    Ok(response::ok(boats))
}

async fn get_boat(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Path(boat_id): Path<BoatId>,
) -> Result<Json<ApiResponse<Boat>>, ApiError> {
    let boat = boats::find_by_id(&state.pool, club.id, boat_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("boat not found".to_string()))?;
    Ok(response::ok(boat))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/boats", get(list_boats))
        .route("/boats/{id}", get(get_boat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamps_to_max() {
        let query = ListBoatsQuery { limit: Some(10_000), offset: None };
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        assert_eq!(limit, MAX_LIMIT);
    }

    #[test]
    fn missing_limit_defaults_to_100() {
        let query = ListBoatsQuery { limit: None, offset: None };
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        assert_eq!(limit, 100);
    }
}
