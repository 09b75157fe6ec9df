//! Health check endpoint. Deliberately not behind the tenant resolver — a
//! monitoring probe has no `Host` worth resolving (§4.5).

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub checks: Checks,
}

#[derive(Debug, Serialize)]
pub struct Checks {
    pub database: CheckResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub status: String,
    pub latency_ms: u128,
}

async fn health_check(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let db_ok = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();
    let latency_ms = started.elapsed().as_millis();

    if !db_ok {
        tracing::error!("database health check failed");
    }

    let response = HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        checks: Checks {
            database: CheckResult {
                status: if db_ok { "healthy" } else { "unhealthy" }.to_string(),
                latency_ms,
            },
        },
    };

    let status_code = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(response)).into_response()
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes_nested_checks() {
        let response = HealthResponse {
            status: "ok".to_string(),
            checks: Checks {
                database: CheckResult { status: "healthy".to_string(), latency_ms: 3 },
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"checks\""));
        assert!(json.contains("\"latencyMs\"") || json.contains("latency_ms"));
    }
}
