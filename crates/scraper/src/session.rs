//! One authenticated session against an upstream `revsport`-shaped site.
//! Every request within one scrape shares a single cookie jar; jars are
//! never shared across scrapes or clubs.

use crate::error::ScrapeError;
use crate::parse::{self, RawBoatCard, UpstreamBookingEntry};
use chrono::NaiveDate;
use drydock_core::security::UpstreamCredentials;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const POST_LOGIN_SETTLE: Duration = Duration::from_secs(1);
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build a fresh client and log in. Retries transport failures internally;
/// an auth-shaped failure (bad credentials, missing CSRF token, a login
/// form or alert still present after posting) never retries.
pub async fn login(base_url: &str, creds: &UpstreamCredentials) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ScrapeError::Upstream(format!("failed to build http client: {e}")))?;

    let login_page = with_retry(|| async {
        client
            .get(format!("{base_url}/login"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    })
    .await
    .map_err(|e| ScrapeError::Upstream(format!("failed to fetch login page: {e}")))?;

    let csrf_token = parse::extract_csrf_token(&login_page)
        .ok_or_else(|| ScrapeError::Auth("login page has no CSRF token".into()))?;

    let form = [
        ("_token", csrf_token.as_str()),
        ("username", creds.username.as_str()),
        ("password", creds.password.as_str()),
        ("remember", "on"),
    ];

    // Status is not trustworthy here: the upstream returns 200, 302, or
    // even 500 on both success and failure.
    let _ = client
        .post(format!("{base_url}/login"))
        .form(&form)
        .send()
        .await
        .map_err(|e| ScrapeError::Upstream(format!("login POST failed: {e}")))?;

    tokio::time::sleep(POST_LOGIN_SETTLE).await;

    let bookings_page = with_retry(|| async {
        client
            .get(format!("{base_url}/bookings"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    })
    .await
    .map_err(|e| ScrapeError::Upstream(format!("failed to fetch /bookings: {e}")))?;

    if !parse::looks_authenticated(&bookings_page) {
        let detail = parse::extract_alert_text(&bookings_page)
            .unwrap_or_else(|| "login form still present after authentication".to_string());
        return Err(ScrapeError::Auth(detail));
    }

    Ok(client)
}

/// Enumerate the club's boats from `/bookings`.
pub async fn fetch_boats(client: &reqwest::Client, base_url: &str) -> Result<Vec<RawBoatCard>, ScrapeError> {
    let html = with_retry(|| async {
        client
            .get(format!("{base_url}/bookings"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    })
    .await
    .map_err(|e| ScrapeError::Upstream(format!("failed to fetch asset list: {e}")))?;

    let cards = parse::parse_boat_cards(&html);
    if cards.is_empty() {
        return Err(ScrapeError::Upstream("asset list returned zero cards".into()));
    }
    Ok(cards)
}

/// Fetch one boat's bookings for `[start, end]`.
pub async fn fetch_calendar(
    client: &reqwest::Client,
    base_url: &str,
    source_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<UpstreamBookingEntry>, ScrapeError> {
    let url = format!(
        "{base_url}/bookings/retrieve-calendar/{source_id}?start={start}&end={end}",
        start = start.format("%Y-%m-%d"),
        end = end.format("%Y-%m-%d"),
    );

    let entries = with_retry(|| async {
        client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<UpstreamBookingEntry>>()
            .await
    })
    .await
    .map_err(|e| ScrapeError::Upstream(format!("failed to fetch calendar for {source_id}: {e}")))?;

    Ok(entries)
}

/// Retry a transport-level fault twice with exponential backoff. Does not
/// distinguish auth-shaped failures from transport ones; callers that need
/// `AuthError` semantics inspect the page content themselves, not the
/// `Result` of this helper.
async fn with_retry<F, Fut, T>(mut f: F) -> Result<T, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < 2 => {
                attempt += 1;
                let backoff = Duration::from_millis(200 * 2u64.pow(attempt));
                tracing::warn!(attempt, error = %e, "retrying upstream request");
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}
