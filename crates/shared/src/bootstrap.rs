use anyhow::Result;
use drydock_core::config::CoreConfig;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load `.env` if present; no-op in production where the environment is
/// already populated.
pub fn init_env() {
    dotenvy::dotenv().ok();
}

/// Initialize tracing with stdout plus optional file logging. The returned
/// guard must be held for the process lifetime or the non-blocking file
/// writer drops pending log lines on exit.
pub fn init_tracing(service_name: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs/app".to_string());

    let now = chrono::Local::now().format("%y-%m-%d-%H-%M-%S").to_string();
    let filename = format!("drydock-{service_name}-{now}.log.jsonl");

    let default_filter = format!("info,{service_name}=debug,sqlx=warn");
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true));

    let enable_file_logging = std::env::var("ENABLE_FILE_LOGGING")
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(true);

    if enable_file_logging {
        let file_appender = tracing_appender::rolling::never(&log_dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .json(),
            )
            .init();

        Some(guard)
    } else {
        registry.init();
        None
    }
}

/// Open the shared Postgres pool. Sizing is a config concern; callers
/// should cover the scraper's worker pool plus expected request concurrency.
pub async fn init_db(config: &CoreConfig) -> Result<sqlx::PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .idle_timeout(std::time::Duration::from_secs(300))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "database pool established"
    );

    Ok(pool)
}
