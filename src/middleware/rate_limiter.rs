//! Rate limiting middleware

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::error::ApiError;
use crate::rate_limit::SlidingWindowLimiter;

/// Limiter plus the proxies whose forwarding headers are believed
#[derive(Clone)]
pub struct ClientRateLimit {
    limiter: SlidingWindowLimiter,
    trusted_proxies: Arc<Vec<IpAddr>>,
}

impl ClientRateLimit {
    pub fn new(limiter: SlidingWindowLimiter) -> Self {
        Self {
            limiter,
            trusted_proxies: Arc::new(Vec::new()),
        }
    }

    /// Honour `X-Forwarded-For` / `X-Real-IP` only from these peers
    pub fn trust_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = Arc::new(proxies);
        self
    }
}

/// Reject clients over the limiter's window; store outages let requests through
pub async fn enforce_rate_limit(
    State(rate_limit): State<ClientRateLimit>,
    request: Request,
    next: Next,
) -> Response {
    let client_key = client_ip(&request, &rate_limit.trusted_proxies);

    if !rate_limit.limiter.check(&client_key).await {
        tracing::warn!(client = %client_key, "Rate limit exceeded");
        return ApiError::TooManyRequests {
            retry_after_secs: rate_limit.limiter.window().as_secs().max(1),
        }
        .into_response();
    }

    next.run(request).await
}

/// Resolve the client address used as the rate limit key.
///
/// The socket peer is authoritative. Forwarding headers are read only when the
/// peer is a trusted proxy, and then the right-most hop that is not itself a
/// trusted proxy wins.
pub fn client_ip(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>() else {
        return "unknown".to_string();
    };
    let peer = peer.ip();

    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    forwarded_client(request.headers(), trusted_proxies)
        .unwrap_or(peer)
        .to_string()
}

fn forwarded_client(headers: &HeaderMap, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        let forwarded = forwarded.to_str().ok()?;
        for hop in forwarded.rsplit(',').map(str::trim) {
            match hop.parse::<IpAddr>() {
                Ok(ip) if trusted_proxies.contains(&ip) => continue,
                Ok(ip) => return Some(ip),
                // chain is unreadable past this point
                Err(_) => return None,
            }
        }
        return None;
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    const PROXY: [u8; 4] = [10, 0, 0, 1];

    fn request_from(peer: [u8; 4], headers: &[(&str, &str)]) -> Request {
        let mut builder = Request::builder();
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4000))));
        request
    }

    fn trusted() -> Vec<IpAddr> {
        vec![IpAddr::from(PROXY)]
    }

    #[test]
    fn test_client_ip_ignores_forwarding_headers_from_untrusted_peer() {
        let request = request_from(
            [192, 0, 2, 1],
            &[("x-forwarded-for", "203.0.113.7"), ("x-real-ip", "203.0.113.8")],
        );
        assert_eq!(client_ip(&request, &[]), "192.0.2.1");
        assert_eq!(client_ip(&request, &trusted()), "192.0.2.1");
    }

    #[test]
    fn test_client_ip_takes_rightmost_untrusted_hop() {
        let request = request_from(
            PROXY,
            &[("x-forwarded-for", "1.1.1.1, 203.0.113.7, 10.0.0.1")],
        );
        assert_eq!(client_ip(&request, &trusted()), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_behind_proxy() {
        let request = request_from(PROXY, &[("x-real-ip", "203.0.113.8")]);
        assert_eq!(client_ip(&request, &trusted()), "203.0.113.8");
    }

    #[test]
    fn test_client_ip_uses_proxy_when_chain_is_unreadable() {
        let request = request_from(PROXY, &[("x-forwarded-for", "not-an-ip")]);
        assert_eq!(client_ip(&request, &trusted()), "10.0.0.1");
    }

    #[test]
    fn test_client_ip_unknown() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request, &trusted()), "unknown");
    }
}
