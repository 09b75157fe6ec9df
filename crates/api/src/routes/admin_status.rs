//! `GET /admin/status` (§4.5) — recent scrape jobs plus a 24h rollup.

use crate::AppState;
use crate::db::scrape_jobs;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Duration;
use drydock_core::models::ScrapeJob;
use serde::Serialize;

const RECENT_JOBS_LIMIT: i64 = 20;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    recent_jobs: Vec<ScrapeJob>,
    last_24h: Last24h,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Last24h {
    success_count: i64,
    fail_count: i64,
    avg_duration_ms: Option<f64>,
}

async fn status(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    let recent_jobs = scrape_jobs::list_recent(&state.pool, club.id, RECENT_JOBS_LIMIT).await?;
    let since = chrono::Utc::now() - Duration::hours(24);
    let summary = scrape_jobs::summarize_last_24h(&state.pool, club.id, since).await?;

    Ok(response::ok(StatusResponse {
        recent_jobs,
        last_24h: Last24h {
            success_count: summary.success_count,
            fail_count: summary.fail_count,
            avg_duration_ms: summary.avg_duration_ms,
        },
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(status))
}
