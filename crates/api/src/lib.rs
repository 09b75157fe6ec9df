//! Drydock API server library

pub mod config;
pub mod db;
pub mod error;
mod middleware;
pub mod response;
mod routes;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::{Router, middleware as axum_middleware};
use drydock_scraper::ScrapeExecutor;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::rate_limit::{ClubKeyExtractor, IpKeyExtractor};
use crate::middleware::tenant_resolver::ResolvedClub;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub base_domain: String,
    pub marketing_url: String,
    pub allow_localhost: bool,
    pub dev_club_subdomain: String,
    pub jwt_secret: String,
    pub jwt_expires_in_sec: i64,
    pub encryption_key: [u8; 32],
    pub executor: Arc<ScrapeExecutor>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Build the application router. Middleware order matches the multi-tenant
/// request pipeline exactly: security headers, then body limit, then (inside
/// each nest) tenant resolution, then CORS, then rate limiting. CORS runs
/// after tenant resolution because its allow-list needs the resolved club's
/// `custom_domain`.
pub fn create_router(state: AppState, config: &config::ApiConfig) -> Router {
    let cors = build_cors(state.base_domain.clone(), state.allow_localhost);

    let public_routes = Router::new()
        .merge(routes::boats::routes())
        .merge(routes::bookings::routes())
        .merge(routes::config::public_routes())
        .layer(GovernorLayer::new(
            GovernorConfigBuilder::default()
                .period(Duration::from_secs(60) / config.public_rate_limit_per_min.max(1))
                .burst_size(config.public_rate_limit_per_min)
                .key_extractor(ClubKeyExtractor)
                .finish()
                .expect("failed to build public governor config"),
        ))
        .layer(cors.clone())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::tenant_resolver::resolve_tenant,
        ));

    let login_routes = Router::new().merge(routes::admin_login::routes()).layer(
        GovernorLayer::new(
            GovernorConfigBuilder::default()
                .period(Duration::from_secs(60) / config.login_rate_limit_per_ip_per_min.max(1))
                .burst_size(config.login_rate_limit_per_ip_per_min)
                .key_extractor(IpKeyExtractor::new(config.trusted_proxies.clone()))
                .finish()
                .expect("failed to build login governor config"),
        ),
    );

    let admin_routes = Router::new()
        .merge(routes::admin_status::routes())
        .merge(routes::admin_credentials::routes())
        .merge(routes::admin_display::routes())
        .merge(routes::admin_sync::routes())
        .merge(routes::config::admin_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::require_admin,
        ))
        .layer(GovernorLayer::new(
            GovernorConfigBuilder::default()
                .period(Duration::from_secs(60) / config.admin_rate_limit_per_min.max(1))
                .burst_size(config.admin_rate_limit_per_min)
                .key_extractor(ClubKeyExtractor)
                .finish()
                .expect("failed to build admin governor config"),
        ))
        .merge(login_routes)
        .layer(cors)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::tenant_resolver::resolve_tenant,
        ));

    let api_v1 = Router::new()
        .merge(routes::health::routes())
        .merge(public_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum_middleware::from_fn(
            crate::middleware::security_headers::security_headers,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let remote_addr = request
                        .extensions()
                        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
                        .map(|ci| ci.0.to_string())
                        .unwrap_or_else(|| "unknown".into());

                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        remote_addr = %remote_addr,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %response.status(),
                            "finished processing request"
                        );
                    },
                ),
        )
        .with_state(state)
}

/// Allows `https://{base_domain}`, any subdomain of it, and whichever club's
/// `custom_domain` the request already resolved to (read from the
/// [`ResolvedClub`] extension set by `resolve_tenant`, which always runs
/// before this layer). `allow_localhost` additionally allows `localhost`
/// origins of either scheme, for local frontend development.
fn build_cors(base_domain: String, allow_localhost: bool) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, parts| {
            origin_is_allowed(origin, parts, &base_domain, allow_localhost)
        }))
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(true)
}

fn origin_is_allowed(origin: &HeaderValue, parts: &Parts, base_domain: &str, allow_localhost: bool) -> bool {
    let Some(host) = origin.to_str().ok().and_then(origin_host) else {
        return false;
    };

    if host == base_domain || host.ends_with(&format!(".{base_domain}")) {
        return true;
    }

    if allow_localhost && (host == "localhost" || host == "127.0.0.1") {
        return true;
    }

    parts
        .extensions
        .get::<ResolvedClub>()
        .and_then(|club| club.0.custom_domain.as_deref())
        .is_some_and(|custom| custom == host)
}

/// The hostname portion of an `Origin` header value, lowercased and stripped
/// of scheme and port.
fn origin_host(origin: &str) -> Option<String> {
    let rest = origin.strip_prefix("https://").or_else(|| origin.strip_prefix("http://"))?;
    let host = rest.split(['/', ':']).next().unwrap_or(rest);
    Some(host.to_lowercase())
}

/// Run the API server. Blocks until the listener is closed.
pub async fn run_api(state: AppState, config: &config::ApiConfig) -> Result<(), std::io::Error> {
    let app = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
}
