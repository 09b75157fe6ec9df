//! The one boundary where domain errors become HTTP responses (§7/§10).
//!
//! Every variant maps to exactly one of the closed taxonomy codes; nothing
//! downstream of [`ApiError::into_response`] ever sees a stack trace.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drydock_core::{TokenError, ValidationError, VaultError};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Validation(ValidationError),
    RateLimited,
    ScrapeInProgress,
    Upstream(String),
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    request_id: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::ScrapeInProgress => "SCRAPE_IN_PROGRESS",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ScrapeInProgress => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short human-friendly text, safe for public clients. Admin clients get
    /// the same message here; field-level detail rides in `details` instead.
    fn message(&self) -> String {
        match self {
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::NotFound(msg) | Self::Upstream(msg) => {
                msg.clone()
            }
            Self::Validation(_) => "the request failed validation".to_string(),
            Self::RateLimited => "too many requests".to_string(),
            Self::ScrapeInProgress => "a scrape is already running for this club".to_string(),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "an internal error occurred".to_string()
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Validation(e) => serde_json::to_value(&e.fields).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = Uuid::now_v7().to_string();
        let public_id = request_id.chars().take(8).collect::<String>();

        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code(),
                message: self.message(),
                details: self.details(),
                request_id: public_id,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::WrongTenant { .. } => Self::Forbidden("token is not valid for this club".into()),
            TokenError::UserDeactivated(_) => Self::Unauthorized("account is deactivated".into()),
            TokenError::Malformed | TokenError::BadSignature | TokenError::Expired => {
                Self::Unauthorized("invalid or expired token".into())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<VaultError> for ApiError {
    fn from(err: VaultError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<drydock_scraper::ScrapeError> for ApiError {
    fn from(err: drydock_scraper::ScrapeError) -> Self {
        match err {
            drydock_scraper::ScrapeError::InProgress => Self::ScrapeInProgress,
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("resource not found".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(ApiError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn scrape_in_progress_maps_to_409() {
        assert_eq!(ApiError::ScrapeInProgress.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::ScrapeInProgress.code(), "SCRAPE_IN_PROGRESS");
    }

    #[test]
    fn wrong_tenant_token_is_forbidden_not_unauthorized() {
        let club_a = drydock_core::types::ClubId::new();
        let club_b = drydock_core::types::ClubId::new();
        let err: ApiError = TokenError::WrongTenant {
            token_club: club_a,
            resolved_club: club_b,
        }
        .into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn request_id_public_prefix_is_eight_chars() {
        let err = ApiError::Internal("boom".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
