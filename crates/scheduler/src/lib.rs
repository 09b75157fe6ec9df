//! The adaptive scheduler (§4.2): a single wall-clock-driven loop that
//! decides, every tick, which active clubs are due for a scrape, and runs
//! them under a bounded global concurrency cap.

mod cadence;
mod db;

use chrono::Utc;
use chrono_tz::Tz;
use drydock_core::types::ClubId;
use drydock_scraper::ScrapeExecutor;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Cron-like evaluation granularity. The spec asks for "≤1 min"; 30s leaves
/// headroom under the tightest (2 min) Peak-bucket interval.
const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// How long shutdown waits for in-flight scrapes before giving up on them.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

pub struct Scheduler {
    pool: PgPool,
    executor: Arc<ScrapeExecutor>,
    club_timezone: Tz,
}

impl Scheduler {
    pub fn new(pool: PgPool, executor: Arc<ScrapeExecutor>, club_timezone: Tz) -> Self {
        Self { pool, executor, club_timezone }
    }

    /// Run until `shutdown` is cancelled. Performs one immediate pass on
    /// startup, then ticks every [`TICK_INTERVAL`].
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        let mut inflight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(&mut inflight).await;
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("scheduler shutting down, waiting for in-flight scrapes");
                    break;
                }
            }
        }

        let drain = async {
            while inflight.join_next().await.is_some() {}
        };
        if tokio::time::timeout(SHUTDOWN_DEADLINE, drain).await.is_err() {
            tracing::warn!("shutdown deadline elapsed with scrapes still running; abandoning them");
        }
    }

    async fn tick(&self, inflight: &mut JoinSet<()>) {
        let candidates = match db::fetch_candidates(&self.pool).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to load scheduling candidates");
                return;
            }
        };

        let now = Utc::now();
        for candidate in candidates {
            if !cadence::is_due(candidate.last_success, now, self.club_timezone) {
                continue;
            }
            self.spawn_scrape(inflight, candidate.club_id);
        }
    }

    fn spawn_scrape(&self, inflight: &mut JoinSet<()>, club_id: ClubId) {
        let executor = self.executor.clone();
        inflight.spawn(async move {
            match executor.try_run(club_id).await {
                Ok(outcome) => {
                    tracing::info!(
                        %club_id,
                        boats = outcome.boats_count,
                        bookings = outcome.bookings_count,
                        duration_ms = outcome.duration_ms,
                        "periodic scrape completed"
                    );
                }
                Err(drydock_scraper::ScrapeError::InProgress) => {
                    tracing::debug!(%club_id, "skipping tick, scrape already in flight");
                }
                Err(e) => {
                    tracing::warn!(%club_id, error = %e, "periodic scrape failed");
                }
            }
        });
    }
}
