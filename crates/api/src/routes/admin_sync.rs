//! `POST /admin/sync` (§4.2/§4.5). Blocks until the scrape finishes and
//! returns its outcome; fails fast with `409 SCRAPE_IN_PROGRESS` if one for
//! this club is already running.

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    boats_count: i32,
    bookings_count: i32,
    duration_ms: i64,
}

async fn sync(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
) -> Result<Json<ApiResponse<SyncResponse>>, ApiError> {
    let outcome = state.executor.try_run(club.id).await?;
    Ok(response::ok(SyncResponse {
        boats_count: outcome.boats_count,
        bookings_count: outcome.bookings_count,
        duration_ms: outcome.duration_ms,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/sync", post(sync))
}
