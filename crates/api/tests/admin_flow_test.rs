//! End-to-end exercise of tenant resolution, admin login, and the
//! auth-gated admin routes against a real Postgres instance, following the
//! starting repo's full-flow integration test shape (build the router,
//! drive it with `tower::ServiceExt::oneshot`, assert on the response).

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use drydock_api::config::ApiConfig;
use drydock_api::{create_router, AppState};
use drydock_core::security;
use drydock_scraper::ScrapeExecutor;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> ApiConfig {
    unsafe {
        std::env::set_var("ENCRYPTION_KEY", hex::encode([7u8; 32]));
        std::env::set_var("DATABASE_URL", "postgres://unused");
        std::env::set_var("JWT_SECRET", "test-secret");
        std::env::set_var("BASE_DOMAIN", "rowline.test");
        std::env::set_var("MARKETING_URL", "https://rowline.test");
        std::env::set_var("ALLOW_LOCALHOST", "false");
    }
    ApiConfig::from_env().expect("test config must build")
}

async fn test_state(pool: PgPool, config: &ApiConfig) -> AppState {
    let executor = Arc::new(ScrapeExecutor::new(pool.clone(), config.core.encryption_key, config.core.days_ahead, 1));
    AppState {
        pool,
        base_domain: config.core.base_domain.clone(),
        marketing_url: config.core.marketing_url.clone(),
        allow_localhost: config.core.allow_localhost,
        dev_club_subdomain: config.dev_club_subdomain.clone(),
        jwt_secret: config.core.jwt_secret.clone(),
        jwt_expires_in_sec: config.jwt_expires_in_sec,
        encryption_key: config.core.encryption_key,
        executor,
    }
}

async fn seed_club_and_admin(pool: &PgPool) -> (String, String, String) {
    let subdomain = format!("club{}", uuid::Uuid::now_v7().simple());
    let club_id: uuid::Uuid =
        sqlx::query_scalar("INSERT INTO clubs (id, name, subdomain, status) VALUES (gen_random_uuid(), $1, $2, 'active') RETURNING id")
            .bind("Test Rowing Club")
            .bind(&subdomain)
            .fetch_one(pool)
            .await
            .unwrap();

    let email = "coach@example.com".to_string();
    let password_hash = security::hash_password("correct horse battery").unwrap();
    sqlx::query("INSERT INTO users (id, club_id, email, password_hash, full_name) VALUES (gen_random_uuid(), $1, $2, $3, 'Coach')")
        .bind(club_id)
        .bind(&email)
        .bind(&password_hash)
        .execute(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO boats (id, club_id, source_id, name, boat_type) VALUES (gen_random_uuid(), $1, 's1', '1x Skiff', 'single scull')")
        .bind(club_id)
        .execute(pool)
        .await
        .unwrap();

    (format!("{subdomain}.rowline.test"), email, club_id.to_string())
}

#[sqlx::test(migrations = "../../migrations")]
async fn public_boats_require_a_resolvable_host(pool: PgPool) {
    let config = test_config();
    let (host, _email, _club_id) = seed_club_and_admin(&pool).await;
    let app = create_router(test_state(pool, &config).await, &config);

    let req = Request::builder()
        .uri("/api/v1/boats")
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let req = Request::builder()
        .uri("/api/v1/boats")
        .header(header::HOST, "unknown.rowline.test")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn login_then_status_round_trip(pool: PgPool) {
    let config = test_config();
    let (host, email, _club_id) = seed_club_and_admin(&pool).await;
    let app = create_router(test_state(pool, &config).await, &config);

    let login_req = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/login")
        .header(header::HOST, &host)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": email, "password": "correct horse battery"}).to_string(),
        ))
        .unwrap();
    let login_res = app.clone().oneshot(login_req).await.unwrap();
    assert_eq!(login_res.status(), StatusCode::OK);

    let body = axum::body::to_bytes(login_res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let status_req = Request::builder()
        .uri("/api/v1/admin/status")
        .header(header::HOST, &host)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let status_res = app.clone().oneshot(status_req).await.unwrap();
    assert_eq!(status_res.status(), StatusCode::OK);

    let unauthed_req = Request::builder()
        .uri("/api/v1/admin/status")
        .header(header::HOST, &host)
        .body(Body::empty())
        .unwrap();
    let unauthed_res = app.oneshot(unauthed_req).await.unwrap();
    assert_eq!(unauthed_res.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn wrong_password_does_not_reveal_which_field_was_wrong(pool: PgPool) {
    let config = test_config();
    let (host, email, _club_id) = seed_club_and_admin(&pool).await;
    let app = create_router(test_state(pool, &config).await, &config);

    let bad_password = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/login")
        .header(header::HOST, &host)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"email": email, "password": "wrong"}).to_string()))
        .unwrap();
    let res1 = app.clone().oneshot(bad_password).await.unwrap();
    let status1 = res1.status();
    let body1 = axum::body::to_bytes(res1.into_body(), usize::MAX).await.unwrap();

    let bad_email = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/login")
        .header(header::HOST, &host)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"email": "nobody@example.com", "password": "wrong"}).to_string()))
        .unwrap();
    let res2 = app.oneshot(bad_email).await.unwrap();
    let status2 = res2.status();
    let body2 = axum::body::to_bytes(res2.into_body(), usize::MAX).await.unwrap();

    assert_eq!(status1, StatusCode::UNAUTHORIZED);
    assert_eq!(status1, status2);
    assert_eq!(body1, body2);
}
