use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use folio_core::{ClientKey, Decision, RateLimiter};

use crate::error::AppError;
use crate::state::AppState;

/// Admission through the contact-submission limiter.
pub struct ContactQuota;

/// Admission through the login limiter.
pub struct LoginQuota;

impl FromRequestParts<AppState> for ContactQuota {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, &state.contact_limiter, "contact")?;
        Ok(ContactQuota)
    }
}

impl FromRequestParts<AppState> for LoginQuota {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, &state.login_limiter, "login")?;
        Ok(LoginQuota)
    }
}

fn admit(
    parts: &Parts,
    state: &AppState,
    limiter: &RateLimiter,
    scope: &'static str,
) -> Result<(), AppError> {
    let key = client_key(parts, state.config.rate_limit.trust_forwarded_for);
    let decision = limiter.allow(&key, state.clock.instant());
    if let Decision::Reject { retry_after } = decision {
        tracing::warn!(client = %key, scope, ?retry_after, "Rate limit exceeded");
    }
    decision.into_result().map_err(AppError::from)
}

/// Derives the rate-limit key from the peer address, or from the first
/// `X-Forwarded-For` hop when the proxy is trusted.
pub fn client_key(parts: &Parts, trust_forwarded_for: bool) -> ClientKey {
    if trust_forwarded_for {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ClientKey::from(ip);
        }
    }

    parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| ClientKey::from(addr.ip()))
        .unwrap_or_else(|| ClientKey::from("unknown"))
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(forwarded: Option<&str>, peer: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(()).unwrap();
        if let Some(addr) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        }
        request.into_parts().0
    }

    #[test]
    fn uses_peer_ip_without_port() {
        let p = parts(None, Some("192.0.2.4:51234"));
        assert_eq!(client_key(&p, false).as_str(), "192.0.2.4");
    }

    #[test]
    fn ignores_forwarded_header_unless_trusted() {
        let p = parts(Some("203.0.113.7"), Some("10.0.0.1:80"));
        assert_eq!(client_key(&p, false).as_str(), "10.0.0.1");
    }

    #[test]
    fn trusted_forwarded_header_uses_first_hop() {
        let p = parts(Some(" 203.0.113.7 , 10.0.0.1"), Some("10.0.0.1:80"));
        assert_eq!(client_key(&p, true).as_str(), "203.0.113.7");
    }

    #[test]
    fn empty_forwarded_header_falls_back_to_peer() {
        let p = parts(Some(""), Some("10.0.0.1:80"));
        assert_eq!(client_key(&p, true).as_str(), "10.0.0.1");
    }

    #[test]
    fn no_origin_information_shares_one_bucket() {
        let p = parts(None, None);
        assert_eq!(client_key(&p, true).as_str(), "unknown");
    }
}
