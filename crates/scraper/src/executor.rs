//! Per-process single-flight scrape executor (§4.2/§5). Both the scheduler
//! binary and the API's on-demand route hold one of these each —
//! independently, since they're separate processes and share no memory.

use crate::db::{self, FetchedBoat};
use crate::error::ScrapeError;
use crate::{parse, session};
use chrono::{Duration as ChronoDuration, Utc};
use drydock_core::models::ScrapeJobStatus;
use drydock_core::security::{self, UpstreamCredentials};
use drydock_core::types::ClubId;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Semaphore};

/// How many per-boat calendar fetches run concurrently within one scrape.
/// Bounded deliberately — the upstream blocks unbounded fan-out behind a WAF.
const PER_CLUB_FETCH_CONCURRENCY: usize = 5;

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub boats_count: i32,
    pub bookings_count: i32,
    pub duration_ms: i64,
}

type JoinChannel = watch::Receiver<Option<Result<ScrapeOutcome, ScrapeError>>>;

pub struct ScrapeExecutor {
    pool: PgPool,
    encryption_key: [u8; 32],
    days_ahead: u32,
    global_cap: Arc<Semaphore>,
    inflight: Mutex<HashMap<ClubId, JoinChannel>>,
}

impl ScrapeExecutor {
    pub fn new(pool: PgPool, encryption_key: [u8; 32], days_ahead: u32, max_concurrent_scrapes: usize) -> Self {
        Self {
            pool,
            encryption_key,
            days_ahead,
            global_cap: Arc::new(Semaphore::new(max_concurrent_scrapes)),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Run a scrape for `club_id`, or join an already-running one. Returns
    /// `Err(ScrapeError::InProgress)` only if the caller explicitly asked
    /// not to wait (see [`Self::try_run`]); this method always waits.
    pub async fn run(&self, club_id: ClubId) -> Result<ScrapeOutcome, ScrapeError> {
        if let Some(mut rx) = self.existing_receiver(club_id).await {
            loop {
                if let Some(result) = rx.borrow().clone() {
                    return result;
                }
                if rx.changed().await.is_err() {
                    return Err(ScrapeError::Upstream("scrape task ended without a result".into()));
                }
            }
        }

        self.lead(club_id).await
    }

    /// Run a scrape, but fail fast with `ScrapeInProgress` instead of
    /// joining if one is already running. Used by periodic ticks, which
    /// would rather skip this cycle than block.
    pub async fn try_run(&self, club_id: ClubId) -> Result<ScrapeOutcome, ScrapeError> {
        if self.existing_receiver(club_id).await.is_some() {
            return Err(ScrapeError::InProgress);
        }
        self.lead(club_id).await
    }

    async fn existing_receiver(&self, club_id: ClubId) -> Option<JoinChannel> {
        self.inflight.lock().await.get(&club_id).cloned()
    }

    async fn lead(&self, club_id: ClubId) -> Result<ScrapeOutcome, ScrapeError> {
        let (tx, rx) = watch::channel(None);
        {
            let mut map = self.inflight.lock().await;
            if map.contains_key(&club_id) {
                // Lost a race to register as leader; join instead.
                drop(map);
                return Box::pin(self.run(club_id)).await;
            }
            map.insert(club_id, rx);
        }

        let _permit = self.global_cap.acquire().await.expect("semaphore never closed");
        let result = self.scrape_once(club_id).await;

        self.inflight.lock().await.remove(&club_id);
        let _ = tx.send(Some(result.clone()));
        result
    }

    async fn scrape_once(&self, club_id: ClubId) -> Result<ScrapeOutcome, ScrapeError> {
        let scrape_started = std::time::Instant::now();
        let club = db::load_club(&self.pool, club_id)
            .await
            .map_err(|e| ScrapeError::Config(format!("failed to load club: {e}")))?;

        let job_id = db::start_scrape_job(&self.pool, club_id)
            .await
            .map_err(|e| ScrapeError::Upstream(format!("failed to record scrape job: {e}")))?;

        let outcome = self.run_scrape(&club, club_id).await;

        let duration_ms = i64::try_from(scrape_started.elapsed().as_millis()).unwrap_or(i64::MAX);
        let (status, boats_count, bookings_count, error) = match &outcome {
            Ok(o) => (ScrapeJobStatus::Completed, o.boats_count, o.bookings_count, None),
            Err(e) => (ScrapeJobStatus::Failed, 0, 0, Some(e.to_string())),
        };

        if let Err(e) = db::finish_scrape_job(
            &self.pool,
            job_id,
            status,
            duration_ms,
            boats_count,
            bookings_count,
            error.as_deref(),
        )
        .await
        {
            tracing::error!(%club_id, error = %e, "failed to finalize scrape job row");
        }

        outcome.map(|mut o| {
            o.duration_ms = duration_ms;
            o
        })
    }

    async fn run_scrape(&self, club: &drydock_core::models::Club, club_id: ClubId) -> Result<ScrapeOutcome, ScrapeError> {
        let base_url = club
            .data_source_config
            .get("url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScrapeError::Config("club has no data_source_config.url".into()))?
            .trim_end_matches('/')
            .to_string();

        let credentials_blob = club
            .data_source_config
            .get("credentials_encrypted")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScrapeError::Config("club has no encrypted credentials".into()))?;

        let creds: UpstreamCredentials = security::decrypt_credentials(credentials_blob, &self.encryption_key)
            .map_err(|e| ScrapeError::Auth(format!("failed to decrypt credentials: {e}")))?;

        let client = session::login(&base_url, &creds).await?;
        let cards = session::fetch_boats(&client, &base_url).await?;

        let window_start = Utc::now().date_naive();
        let window_end = window_start + ChronoDuration::days(i64::from(self.days_ahead));

        let fetch_cap = Arc::new(Semaphore::new(PER_CLUB_FETCH_CONCURRENCY));
        let mut joins = tokio::task::JoinSet::new();
        for card in cards {
            let client = client.clone();
            let base_url = base_url.clone();
            let fetch_cap = fetch_cap.clone();
            joins.spawn(async move {
                let _permit = fetch_cap.acquire_owned().await.expect("semaphore never closed");
                let entries = session::fetch_calendar(&client, &base_url, &card.source_id, window_start, window_end).await;
                (card, entries)
            });
        }

        let mut fetched = Vec::new();
        let mut failures = 0usize;
        while let Some(joined) = joins.join_next().await {
            let (card, entries) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    failures += 1;
                    tracing::warn!(%club_id, error = %e, "calendar fetch task panicked");
                    continue;
                }
            };

            match entries {
                Ok(entries) => {
                    // Keyed by start_time within the date so two upstream
                    // entries for the same slot collapse into one row
                    // instead of both surviving into `bookings`; the later
                    // entry in iteration order wins.
                    let mut slots_by_date: HashMap<chrono::NaiveDate, HashMap<String, drydock_core::models::BookingSlot>> =
                        HashMap::new();
                    for entry in entries {
                        let Ok(date) = chrono::NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d") else {
                            continue;
                        };
                        if date < window_start || date > window_end {
                            continue;
                        }
                        let (Some(start), Some(end)) =
                            (parse::normalize_time(&entry.start_time), parse::normalize_time(&entry.end_time))
                        else {
                            continue;
                        };
                        slots_by_date.entry(date).or_default().insert(
                            start.clone(),
                            drydock_core::models::BookingSlot {
                                start_time: start,
                                end_time: end,
                                member_name: entry.member_name,
                            },
                        );
                    }
                    let bookings_by_date = slots_by_date
                        .into_iter()
                        .map(|(date, slots)| (date, slots.into_values().collect()))
                        .collect();
                    fetched.push(FetchedBoat { card, bookings_by_date });
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(%club_id, boat = %card.source_id, error = %e, "calendar fetch failed for one asset");
                }
            }
        }

        if fetched.is_empty() && failures > 0 {
            return Err(ScrapeError::Upstream(format!(
                "all {failures} calendar fetches failed"
            )));
        }
        if failures > 0 {
            tracing::warn!(%club_id, failures, "scrape completed with partial asset failures");
        }

        let (boats_count, bookings_count) = db::commit_scrape(&self.pool, club_id, &fetched, window_start, window_end)
            .await
            .map_err(|e| ScrapeError::Upstream(format!("failed to persist scrape: {e}")))?;

        Ok(ScrapeOutcome {
            boats_count,
            bookings_count,
            duration_ms: 0,
        })
    }
}
