//! API process configuration. Layered on top of [`drydock_core::config::CoreConfig`]
//! the way the rest of the services do — one typed struct per concern, built
//! from `std::env::var` plus sane defaults (§10).

use anyhow::{Context, Result};
use drydock_core::config::CoreConfig;
use std::env;
use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub core: CoreConfig,
    pub host: String,
    pub port: u16,
    pub jwt_expires_in_sec: i64,
    pub public_rate_limit_per_min: u32,
    pub admin_rate_limit_per_min: u32,
    pub login_rate_limit_per_ip_per_min: u32,
    pub dev_club_subdomain: String,
    /// Peer addresses allowed to set `X-Forwarded-For`/`X-Real-IP` for the
    /// login rate limiter. Empty by default, so the limiter keys on the raw
    /// TCP peer unless a reverse proxy in front of it is explicitly listed.
    pub trusted_proxies: Vec<IpAddr>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let core = CoreConfig::from_env()?;

        Ok(Self {
            core,
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("API_PORT must be a valid u16")?,
            jwt_expires_in_sec: env::var("JWT_EXPIRES_IN_SEC")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("JWT_EXPIRES_IN_SEC must be a valid integer")?,
            public_rate_limit_per_min: env::var("PUBLIC_RATE_LIMIT_PER_MIN")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("PUBLIC_RATE_LIMIT_PER_MIN must be a valid integer")?,
            admin_rate_limit_per_min: env::var("ADMIN_RATE_LIMIT_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .context("ADMIN_RATE_LIMIT_PER_MIN must be a valid integer")?,
            login_rate_limit_per_ip_per_min: env::var("LOGIN_RATE_LIMIT_PER_IP_PER_MIN")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("LOGIN_RATE_LIMIT_PER_IP_PER_MIN must be a valid integer")?,
            dev_club_subdomain: env::var("DEV_CLUB_SUBDOMAIN").unwrap_or_else(|_| "dev".to_string()),
            trusted_proxies: parse_trusted_proxies(&env::var("TRUSTED_PROXY_IPS").unwrap_or_default())?,
        })
    }
}

fn parse_trusted_proxies(raw: &str) -> Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<IpAddr>().with_context(|| format!("invalid address in TRUSTED_PROXY_IPS: '{s}'")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_required_core_env() {
        unsafe {
            env::set_var("ENCRYPTION_KEY", hex::encode([1u8; 32]));
            env::set_var("DATABASE_URL", "postgres://test");
            env::set_var("JWT_SECRET", "secret");
            env::set_var("BASE_DOMAIN", "rowline.app");
            env::set_var("MARKETING_URL", "https://rowline.app");
        }
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        set_required_core_env();
        unsafe {
            env::remove_var("API_PORT");
            env::remove_var("DEV_CLUB_SUBDOMAIN");
        }
        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.dev_club_subdomain, "dev");
        assert_eq!(config.jwt_expires_in_sec, 3600);
        assert!(config.trusted_proxies.is_empty());
    }

    #[test]
    fn parses_trusted_proxy_list() {
        let parsed = parse_trusted_proxies("10.0.0.1, 10.0.0.2").unwrap();
        assert_eq!(parsed, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "10.0.0.2".parse().unwrap()]);
    }

    #[test]
    fn rejects_invalid_trusted_proxy_entry() {
        assert!(parse_trusted_proxies("not-an-ip").is_err());
    }

    #[test]
    fn empty_trusted_proxy_list_is_fine() {
        assert!(parse_trusted_proxies("").unwrap().is_empty());
    }
}
