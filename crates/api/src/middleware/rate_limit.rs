//! Two token-bucket lanes per club (`public`, `admin`), plus a per-IP bucket
//! for login, all built on `tower-governor` (§4.3 step 4). The login lane's
//! key is the TCP peer address by default; `X-Forwarded-For`/`X-Real-IP` are
//! only honored when that peer is a configured trusted proxy, so an
//! unauthenticated client can't forge a fresh header per request to dodge
//! the bucket.

use crate::middleware::tenant_resolver::ResolvedClub;
use axum::extract::ConnectInfo;
use axum::http::Request;
use drydock_core::types::ClubId;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::errors::GovernorError;
use tower_governor::key_extractor::KeyExtractor;

#[derive(Clone)]
pub struct ClubKeyExtractor;

impl KeyExtractor for ClubKeyExtractor {
    type Key = ClubId;

    fn extract<B>(&self, req: &Request<B>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ResolvedClub>()
            .map(|c| c.0.id)
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

#[derive(Clone)]
pub struct IpKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl IpKeyExtractor {
    pub fn new(trusted_proxies: Vec<IpAddr>) -> Self {
        Self { trusted_proxies: trusted_proxies.into() }
    }
}

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(&self, req: &Request<B>) -> Result<Self::Key, GovernorError> {
        let peer_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        let peer_is_trusted = peer_ip.is_some_and(|ip| self.trusted_proxies.contains(&ip));

        if peer_is_trusted {
            if let Some(header) = req.headers().get("x-forwarded-for") {
                if let Ok(val) = header.to_str() {
                    if let Some(client_ip) = val.split(',').next() {
                        if let Ok(ip) = client_ip.trim().parse::<IpAddr>() {
                            return Ok(ip);
                        }
                    }
                }
            }

            if let Some(header) = req.headers().get("x-real-ip") {
                if let Ok(val) = header.to_str() {
                    if let Ok(ip) = val.trim().parse::<IpAddr>() {
                        return Ok(ip);
                    }
                }
            }
        }

        peer_ip.ok_or(GovernorError::UnableToExtractKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn club_extractor_fails_without_resolved_club() {
        let req = Request::new(Body::empty());
        assert!(ClubKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn ip_extractor_honors_forwarded_for_from_trusted_proxy() {
        let addr: SocketAddr = "10.0.0.5:1234".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));
        req.headers_mut().insert("x-forwarded-for", "203.0.113.9".parse().unwrap());

        let extractor = IpKeyExtractor::new(vec![addr.ip()]);
        let key = extractor.extract(&req).unwrap();
        assert_eq!(key, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn ip_extractor_ignores_forwarded_for_from_untrusted_peer() {
        let addr: SocketAddr = "10.0.0.5:1234".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));
        req.headers_mut().insert("x-forwarded-for", "203.0.113.9".parse().unwrap());

        let extractor = IpKeyExtractor::new(Vec::new());
        let key = extractor.extract(&req).unwrap();
        assert_eq!(key, addr.ip());
    }

    #[test]
    fn ip_extractor_falls_back_to_connect_info() {
        let addr: SocketAddr = "10.0.0.5:1234".parse().unwrap();
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(addr));

        let extractor = IpKeyExtractor::new(Vec::new());
        let key = extractor.extract(&req).unwrap();
        assert_eq!(key, addr.ip());
    }
}
