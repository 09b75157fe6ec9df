//! Shared configuration logic
//!
//! Handles loading of environment variables common to every service
//! (API server, scheduler, provisioning CLI). Required values are validated
//! eagerly so a misconfigured deployment fails at startup, not at first
//! request.

use anyhow::{Context, Result};
use std::env;

/// The 32-byte AEAD key used by [`crate::security::encrypt_credentials`].
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Configuration shared by every service in the deployment.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Database connection URL.
    pub database_url: String,

    /// Maximum size of the shared Postgres connection pool.
    pub db_max_connections: u32,

    /// HMAC signing key for admin bearer tokens.
    pub jwt_secret: String,

    /// 32-byte key (hex-encoded in the environment) for the credential vault.
    pub encryption_key: [u8; ENCRYPTION_KEY_LEN],

    /// The platform's base domain, e.g. `rowline.app`.
    pub base_domain: String,

    /// Where to redirect requests to the bare base domain / `www`.
    pub marketing_url: String,

    /// How many days ahead of today the scraper fetches bookings for.
    pub days_ahead: u32,

    /// Whether `localhost`/`127.0.0.1` resolve to a designated dev club.
    pub allow_localhost: bool,
}

impl CoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Also initializes dotenv if it hasn't been done yet.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let encryption_key = parse_encryption_key(
            &env::var("ENCRYPTION_KEY").context("ENCRYPTION_KEY must be set")?,
        )?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid integer")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            encryption_key,
            base_domain: env::var("BASE_DOMAIN").context("BASE_DOMAIN must be set")?,
            marketing_url: env::var("MARKETING_URL").context("MARKETING_URL must be set")?,
            days_ahead: env::var("DAYS_AHEAD")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("DAYS_AHEAD must be a valid integer")?,
            allow_localhost: env::var("ALLOW_LOCALHOST")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn parse_encryption_key(raw: &str) -> Result<[u8; ENCRYPTION_KEY_LEN]> {
    let bytes = hex::decode(raw).context("ENCRYPTION_KEY must be valid hex")?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| {
        anyhow::anyhow!("ENCRYPTION_KEY must decode to {ENCRYPTION_KEY_LEN} bytes, got {actual}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length_key() {
        let short = hex::encode([0u8; 16]);
        assert!(parse_encryption_key(&short).is_err());
    }

    #[test]
    fn rejects_non_hex_key() {
        assert!(parse_encryption_key("not hex at all!!").is_err());
    }

    #[test]
    fn accepts_32_byte_key() {
        let key = hex::encode([7u8; ENCRYPTION_KEY_LEN]);
        let parsed = parse_encryption_key(&key).unwrap();
        assert_eq!(parsed, [7u8; ENCRYPTION_KEY_LEN]);
    }
}
