//! `GET /config` (public, ETag-cached) and `GET`/`PUT /admin/config` (full
//! display/branding/TV-display CRUD, §4.4/§4.5). `PUT /admin/display`
//! (deep-merge of a partial patch) lives in `admin_display.rs`; this module
//! only replaces the whole thing.

use crate::AppState;
use crate::db::clubs;
use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedAdmin;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use drydock_core::merge::validate_display_config;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubConfig {
    pub display_config: serde_json::Value,
    pub branding: serde_json::Value,
    pub tv_display_config: serde_json::Value,
}

fn etag_for(config: &ClubConfig) -> Result<String, ApiError> {
    let bytes = serde_json::to_vec(config).map_err(|e| ApiError::Internal(e.to_string()))?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("\"{}\"", hex::encode(digest)))
}

fn if_none_match_hits(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == etag)
}

async fn get_config(
    State(_state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let config = ClubConfig {
        display_config: club.display_config.clone(),
        branding: club.branding.clone(),
        tv_display_config: club.tv_display_config.clone(),
    };
    let etag = etag_for(&config)?;

    if if_none_match_hits(&headers, &etag) {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        response
            .headers_mut()
            .insert(header::ETAG, HeaderValue::from_str(&etag).expect("hex etag is valid header value"));
        return Ok(response);
    }

    let mut response = response::ok(config).into_response();
    response
        .headers_mut()
        .insert(header::ETAG, HeaderValue::from_str(&etag).expect("hex etag is valid header value"));
    Ok(response)
}

async fn get_admin_config(
    State(_state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Extension(_admin): Extension<AuthenticatedAdmin>,
) -> Json<ApiResponse<ClubConfig>> {
    response::ok(ClubConfig {
        display_config: club.display_config.clone(),
        branding: club.branding.clone(),
        tv_display_config: club.tv_display_config.clone(),
    })
}

async fn put_admin_config(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Extension(_admin): Extension<AuthenticatedAdmin>,
    Json(config): Json<ClubConfig>,
) -> Result<Json<ApiResponse<ClubConfig>>, ApiError> {
    validate_display_config(&config.display_config)?;

    clubs::update_display_config(
        &state.pool,
        club.id,
        &config.display_config,
        &config.branding,
        &config.tv_display_config,
    )
    .await?;

    Ok(response::ok(config))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/config", get(get_config))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/config", get(get_admin_config).put(put_admin_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_configs_produce_identical_etags() {
        let a = ClubConfig {
            display_config: json!({"daysToDisplay": 7}),
            branding: json!({}),
            tv_display_config: json!({}),
        };
        let b = a.clone();
        assert_eq!(etag_for(&a).unwrap(), etag_for(&b).unwrap());
    }

    #[test]
    fn different_configs_produce_different_etags() {
        let a = ClubConfig { display_config: json!({"daysToDisplay": 7}), branding: json!({}), tv_display_config: json!({}) };
        let b = ClubConfig { display_config: json!({"daysToDisplay": 8}), branding: json!({}), tv_display_config: json!({}) };
        assert_ne!(etag_for(&a).unwrap(), etag_for(&b).unwrap());
    }
}
