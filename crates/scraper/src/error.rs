//! Errors `ScrapeClub` can fail with, per §4.1.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    /// Credentials decrypt failed, the login form was unparseable, or
    /// post-login verification found a login form or an alert banner.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure, unparseable calendar JSON, or zero asset cards
    /// after an otherwise-successful login.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The club has no `data_source_config` or no encrypted credentials.
    #[error("scraper not configured: {0}")]
    Config(String),

    /// Another scrape for this club is already running.
    #[error("scrape already in progress for this club")]
    InProgress,
}
