//! `PUT /admin/credentials` (§4.4). `password` is optional so the URL or
//! username can be updated without rotating the stored secret.

use crate::AppState;
use crate::db::clubs;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::routing::put;
use axum::{Json, Router};
use drydock_core::security::{self, UpstreamCredentials};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateCredentialsRequest {
    url: String,
    username: String,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCredentialsResponse {
    url: String,
    username: String,
}

async fn update_credentials(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Json(req): Json<UpdateCredentialsRequest>,
) -> Result<Json<ApiResponse<UpdateCredentialsResponse>>, ApiError> {
    let password = match req.password {
        Some(password) => password,
        None => {
            let existing_blob = club
                .data_source_config
                .get("credentials_encrypted")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ApiError::Validation(drydock_core::ValidationError::single(
                    "password",
                    "required: no existing credentials to preserve",
                )))?;
            let existing: UpstreamCredentials =
                security::decrypt_credentials(existing_blob, &state.encryption_key)?;
            existing.password
        }
    };

    let creds = UpstreamCredentials { username: req.username.clone(), password };
    let encrypted = security::encrypt_credentials(&creds, &state.encryption_key)?;

    let mut config = club.data_source_config.clone();
    let object = config.as_object_mut().ok_or_else(|| ApiError::Internal("data_source_config is not an object".to_string()))?;
    object.insert("url".to_string(), serde_json::Value::String(req.url.clone()));
    object.insert("credentials_encrypted".to_string(), serde_json::Value::String(encrypted));

    clubs::update_data_source_config(&state.pool, club.id, &config).await?;

    Ok(response::ok(UpdateCredentialsResponse { url: req.url, username: req.username }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/credentials", put(update_credentials))
}
