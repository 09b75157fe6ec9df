use anyhow::Result;
use drydock_api::config::ApiConfig;
use drydock_api::AppState;
use drydock_scraper::ScrapeExecutor;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Scrapes triggered on demand through `/admin/sync` share this cap with no
/// other process — the scheduler binary runs its own, separately configured
/// executor in a different process.
const DEFAULT_MAX_CONCURRENT_SCRAPES: usize = 2;

#[tokio::main]
async fn main() -> Result<()> {
    drydock_shared::bootstrap::init_env();
    let _guard = drydock_shared::bootstrap::init_tracing("server");

    tracing::info!("starting drydock API server");

    let config = ApiConfig::from_env()?;
    let pool = drydock_shared::bootstrap::init_db(&config.core).await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("migrations completed");

    let max_concurrent_scrapes = std::env::var("MAX_CONCURRENT_SCRAPES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_SCRAPES);

    let executor = Arc::new(ScrapeExecutor::new(
        pool.clone(),
        config.core.encryption_key,
        config.core.days_ahead,
        max_concurrent_scrapes,
    ));

    let state = AppState {
        pool,
        base_domain: config.core.base_domain.clone(),
        marketing_url: config.core.marketing_url.clone(),
        allow_localhost: config.core.allow_localhost,
        dev_club_subdomain: config.dev_club_subdomain.clone(),
        jwt_secret: config.core.jwt_secret.clone(),
        jwt_expires_in_sec: config.jwt_expires_in_sec,
        encryption_key: config.core.encryption_key,
        executor,
    };

    let shutdown = CancellationToken::new();

    let run_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = drydock_api::run_api(state, &config) => {
                    tracing::error!("API server exited: {:?}", result);
                }
                () = shutdown.cancelled() => {
                    tracing::info!("API server shutting down");
                }
            }
        })
    };

    wait_for_shutdown().await;
    tracing::info!("shutdown signal received");
    shutdown.cancel();
    let _ = run_handle.await;

    tracing::info!("server stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
