use anyhow::Result;
use drydock_core::config::CoreConfig;
use drydock_scraper::ScrapeExecutor;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Maximum number of clubs scraped at once across the whole deployment.
const DEFAULT_MAX_CONCURRENT_SCRAPES: usize = 4;

#[tokio::main]
async fn main() -> Result<()> {
    drydock_shared::bootstrap::init_env();
    let _guard = drydock_shared::bootstrap::init_tracing("scheduler");

    tracing::info!("starting adaptive scheduler");

    let config = CoreConfig::from_env()?;
    let pool = drydock_shared::bootstrap::init_db(&config).await?;

    let max_concurrent_scrapes = std::env::var("MAX_CONCURRENT_SCRAPES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_SCRAPES);

    let club_timezone = std::env::var("CLUB_TIMEZONE").unwrap_or_else(|_| "Australia/Sydney".to_string());
    let club_timezone = chrono_tz::Tz::from_str(&club_timezone)
        .map_err(|_| anyhow::anyhow!("CLUB_TIMEZONE '{club_timezone}' is not a valid IANA timezone"))?;

    let executor = Arc::new(ScrapeExecutor::new(
        pool.clone(),
        config.encryption_key,
        config.days_ahead,
        max_concurrent_scrapes,
    ));

    let scheduler = drydock_scheduler::Scheduler::new(pool, executor, club_timezone);
    let shutdown = CancellationToken::new();

    let run_handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scheduler.run(shutdown).await })
    };

    wait_for_shutdown().await;
    tracing::info!("shutdown signal received");
    shutdown.cancel();
    let _ = run_handle.await;

    tracing::info!("scheduler stopped");
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
