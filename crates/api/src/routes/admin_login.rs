//! `POST /admin/login` (§4.5/§4.6). Rate-limited per IP by the governor
//! layer wrapping this route, not here. A bad email and a bad password
//! return the identical error so failures can't be used to enumerate
//! accounts.

use crate::AppState;
use crate::db::users;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use crate::response::{self, ApiResponse};
use axum::extract::{Extension, State};
use axum::routing::post;
use axum::{Json, Router};
use drydock_core::models::UserRole;
use drydock_core::security::{self, PasswordCheck, TokenClaims};
use drydock_core::types::UserId;
use serde::{Deserialize, Serialize};

fn role_claim(role: UserRole) -> String {
    match role {
        UserRole::ClubAdmin => "club_admin".to_string(),
        UserRole::SuperAdmin => "super_admin".to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    token: String,
    expires_in: i64,
    user: AdminUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUser {
    id: UserId,
    email: String,
    full_name: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("invalid email or password".to_string())
}

async fn login(
    State(state): State<AppState>,
    Extension(ResolvedClub(club)): Extension<ResolvedClub>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let user = users::find_by_email(&state.pool, club.id, &req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(invalid_credentials());
    }

    let PasswordCheck { matches, needs_rehash } =
        security::verify_password(&req.password, &user.password_hash).map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(invalid_credentials());
    }

    if needs_rehash {
        if let Ok(new_hash) = security::hash_password(&req.password) {
            if let Err(e) = users::update_password_hash(&state.pool, user.id, &new_hash).await {
                tracing::warn!(user_id = %user.id, error = %e, "failed to persist rehashed password");
            }
        }
    }

    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        user_id: user.id,
        club_id: club.id,
        role: role_claim(user.role),
        iat: now,
        exp: now + state.jwt_expires_in_sec,
    };
    let token = security::issue_token(&claims, &state.jwt_secret).map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response::ok(LoginResponse {
        token,
        expires_in: state.jwt_expires_in_sec,
        user: AdminUser { id: user.id, email: user.email, full_name: user.full_name },
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
