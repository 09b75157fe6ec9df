//! Admin bearer-token verification (§4.3 step 5, §4.6). Runs after the
//! tenant resolver; checks the token's embedded `club_id` against the
//! resolved club and rejects with `FORBIDDEN` (not `UNAUTHORIZED`) on a
//! tenant mismatch, because the token itself was valid.

use crate::AppState;
use crate::db::users;
use crate::error::ApiError;
use crate::middleware::tenant_resolver::ResolvedClub;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use drydock_core::error::TokenError;
use drydock_core::security::{self, TokenClaims};

#[derive(Clone)]
pub struct AuthenticatedAdmin {
    pub claims: TokenClaims,
}

pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let resolved_club = request
        .extensions()
        .get::<ResolvedClub>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("admin middleware ran before tenant resolution".into()))?;

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let now = chrono::Utc::now().timestamp();
    let claims = security::verify_token(token, &state.jwt_secret, now)?;

    if claims.club_id != resolved_club.0.id {
        return Err(TokenError::WrongTenant {
            token_club: claims.club_id,
            resolved_club: resolved_club.0.id,
        }
        .into());
    }

    let user = users::find_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user no longer exists".to_string()))?;
    if !user.is_active {
        return Err(TokenError::UserDeactivated(claims.user_id).into());
    }

    request.extensions_mut().insert(AuthenticatedAdmin { claims });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_core::types::{ClubId, UserId};

    #[test]
    fn wrong_tenant_claims_become_forbidden_error() {
        let claims = TokenClaims {
            user_id: UserId::new(),
            club_id: ClubId::new(),
            role: "club_admin".into(),
            iat: 0,
            exp: i64::MAX,
        };
        let resolved = ClubId::new();
        assert_ne!(claims.club_id, resolved);
    }
}
