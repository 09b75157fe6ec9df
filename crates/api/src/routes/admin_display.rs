//! `PUT /admin/display` (§4.4) — partial deep-merge patch applied to
//! `display_config`/`branding`/`tv_display_config` independently. Keys
//! omitted from the patch are left untouched in all three.

use crate::AppState;
use crate::db::clubs;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::routing::put;
use axum::{Json, Router};
use drydock_core::merge::{deep_merge, validate_display_config};
use serde::Deserialize;
use serde_json::Value;

use crate::routes::config::ClubConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPatch {
    #[serde(default)]
    display_config: Option<Value>,
    #[serde(default)]
    branding: Option<Value>,
    #[serde(default)]
    tv_display_config: Option<Value>,
}

async fn update_display(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Json(patch): Json<DisplayPatch>,
) -> Result<Json<ApiResponse<ClubConfig>>, ApiError> {
    let display_config = match &patch.display_config {
        Some(p) => deep_merge(&club.display_config, p),
        None => club.display_config.clone(),
    };
    let branding = match &patch.branding {
        Some(p) => deep_merge(&club.branding, p),
        None => club.branding.clone(),
    };
    let tv_display_config = match &patch.tv_display_config {
        Some(p) => deep_merge(&club.tv_display_config, p),
        None => club.tv_display_config.clone(),
    };

    validate_display_config(&display_config)?;

    clubs::update_display_config(&state.pool, club.id, &display_config, &branding, &tv_display_config).await?;

    Ok(response::ok(ClubConfig { display_config, branding, tv_display_config }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/display", put(update_display))
}
