//! Resolves `Host` to a club and attaches it to the request (§4.3 step 3).
//! Grounded on the "extract, look up, stash in extensions" shape of the
//! basic-auth middleware this service used to carry, replumbed from
//! credential lookup to Host-based tenant lookup.

use crate::AppState;
use crate::db::clubs;
use crate::error::ApiError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use drydock_core::models::Club;

/// The club resolved for this request. Handlers read it from extensions,
/// never by re-deriving it from the Host header themselves.
#[derive(Clone)]
pub struct ResolvedClub(pub Club);

pub async fn resolve_tenant(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let host = match extract_host(&request) {
        Some(h) => h,
        None => return ApiError::NotFound("no Host header".into()).into_response(),
    };

    match resolve(&state, &host).await {
        Ok(Resolution::Club(club)) => {
            request.extensions_mut().insert(ResolvedClub(club));
            next.run(request).await
        }
        Ok(Resolution::MarketingRedirect) => Redirect::temporary(&state.marketing_url).into_response(),
        Ok(Resolution::NoMatch) => ApiError::NotFound(format!("no club for host '{host}'")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

enum Resolution {
    Club(Club),
    MarketingRedirect,
    NoMatch,
}

async fn resolve(state: &AppState, host: &str) -> Result<Resolution, sqlx::Error> {
    if let Some(club) = clubs::find_by_custom_domain(&state.pool, host).await? {
        return Ok(Resolution::Club(club));
    }

    if let Some(subdomain) = host.strip_suffix(&format!(".{}", state.base_domain)) {
        if let Some(club) = clubs::find_by_subdomain(&state.pool, subdomain).await? {
            return Ok(Resolution::Club(club));
        }
    }

    if host == state.base_domain || host == format!("www.{}", state.base_domain) {
        return Ok(Resolution::MarketingRedirect);
    }

    if state.allow_localhost && is_localhost(host) {
        if let Some(club) = clubs::find_by_subdomain(&state.pool, &state.dev_club_subdomain).await? {
            return Ok(Resolution::Club(club));
        }
    }

    Ok(Resolution::NoMatch)
}

fn is_localhost(host: &str) -> bool {
    host == "localhost" || host == "127.0.0.1"
}

/// Lowercase the `Host` header and strip a trailing `:port`.
fn extract_host(request: &Request) -> Option<String> {
    let raw = request.headers().get(axum::http::header::HOST)?.to_str().ok()?;
    let lower = raw.to_lowercase();
    Some(lower.split(':').next().unwrap_or(&lower).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn strips_port_and_lowercases() {
        let req = HttpRequest::builder()
            .header(axum::http::header::HOST, "LMRC.Rowline.App:443")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_host(&req).as_deref(), Some("lmrc.rowline.app"));
    }

    #[test]
    fn recognizes_localhost_and_loopback() {
        assert!(is_localhost("localhost"));
        assert!(is_localhost("127.0.0.1"));
        assert!(!is_localhost("lmrc.rowline.app"));
    }
}
