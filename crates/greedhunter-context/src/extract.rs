//! Context extraction from inbound requests
//!
//! The extractor works on a borrowed view of the request (headers, method,
//! path, transport address) so it stays independent of any routing layer.

use std::net::SocketAddr;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Borrowed view of an inbound request, assembled by the HTTP layer
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Request headers
    pub headers: HeaderMap,
    /// HTTP method (e.g. "POST")
    pub method: String,
    /// Request path (e.g. "/api/wallet/earn")
    pub path: String,
    /// Transport-level peer address, when known
    pub remote_addr: Option<SocketAddr>,
    /// IP the framework reports for the request, when known
    pub reported_ip: Option<String>,
}

impl RequestMeta {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            headers: HeaderMap::new(),
            method: method.into(),
            path: path.into(),
            remote_addr: None,
            reported_ip: None,
        }
    }

    /// Look up a header as a string, empty-safe
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Context captured for one activity entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Bearer token, `accessToken` cookie, or the caller's fallback session id
    pub token: Option<String>,
    /// Raw user-agent string, empty when absent
    pub user_agent: String,
    /// Client IP, empty when it cannot be determined
    pub ip_address: String,
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,
}

/// Derive the request context for an activity entry.
///
/// With no request at hand the context is all-empty and the fallback session
/// id (if any) becomes the token.
pub fn extract_context(
    request: Option<&RequestMeta>,
    fallback_session: Option<&str>,
) -> RequestContext {
    let Some(meta) = request else {
        return RequestContext {
            token: fallback_session.map(String::from),
            ..RequestContext::default()
        };
    };

    RequestContext {
        token: resolve_token(meta, fallback_session),
        user_agent: meta.header("User-Agent").unwrap_or("").to_string(),
        ip_address: resolve_ip(meta),
        method: meta.method.clone(),
        path: meta.path.clone(),
    }
}

/// Token resolution: Authorization bearer, then `accessToken` cookie, then
/// the fallback session id
fn resolve_token(meta: &RequestMeta, fallback_session: Option<&str>) -> Option<String> {
    if let Some(auth) = meta.header("Authorization") {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = meta.header("Cookie") {
        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some(token) = cookie.strip_prefix("accessToken=") {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    fallback_session.map(String::from)
}

/// IP resolution: first X-Forwarded-For hop, then X-Real-IP, then the
/// transport address, then the framework-reported IP
fn resolve_ip(meta: &RequestMeta) -> String {
    if let Some(forwarded) = meta.header("X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return normalize_ip(first);
            }
        }
    }

    if let Some(real_ip) = meta.header("X-Real-IP") {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return normalize_ip(real_ip);
        }
    }

    if let Some(addr) = meta.remote_addr {
        return normalize_ip(&addr.ip().to_string());
    }

    if let Some(reported) = &meta.reported_ip {
        return normalize_ip(reported);
    }

    String::new()
}

/// Loopback addresses read as "localhost" in development logs
fn normalize_ip(ip: &str) -> String {
    match ip {
        "::1" | "127.0.0.1" => "localhost".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_with_headers(pairs: &[(&'static str, &str)]) -> RequestMeta {
        let mut meta = RequestMeta::new("GET", "/api/test");
        for (name, value) in pairs {
            meta.headers
                .insert(*name, value.parse().expect("valid header value"));
        }
        meta
    }

    #[test]
    fn test_bearer_token_wins() {
        let meta = meta_with_headers(&[
            ("Authorization", "Bearer top-token"),
            ("Cookie", "accessToken=cookie-token"),
        ]);
        let ctx = extract_context(Some(&meta), Some("fallback"));
        assert_eq!(ctx.token.as_deref(), Some("top-token"));
    }

    #[test]
    fn test_cookie_token_second() {
        let meta = meta_with_headers(&[("Cookie", "theme=dark; accessToken=cookie-token")]);
        let ctx = extract_context(Some(&meta), Some("fallback"));
        assert_eq!(ctx.token.as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_fallback_token_last() {
        let meta = meta_with_headers(&[]);
        let ctx = extract_context(Some(&meta), Some("fallback-session"));
        assert_eq!(ctx.token.as_deref(), Some("fallback-session"));

        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.token, None);
    }

    #[test]
    fn test_no_request_uses_fallback_only() {
        let ctx = extract_context(None, Some("offline-session"));
        assert_eq!(ctx.token.as_deref(), Some("offline-session"));
        assert_eq!(ctx.user_agent, "");
        assert_eq!(ctx.ip_address, "");
        assert_eq!(ctx.method, "");
        assert_eq!(ctx.path, "");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let meta = meta_with_headers(&[("X-Forwarded-For", "10.0.0.5, 10.0.0.1")]);
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.ip_address, "10.0.0.5");
    }

    #[test]
    fn test_real_ip_second() {
        let meta = meta_with_headers(&[("X-Real-IP", "192.168.1.9")]);
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.ip_address, "192.168.1.9");
    }

    #[test]
    fn test_loopback_normalized() {
        let mut meta = RequestMeta::new("GET", "/");
        meta.remote_addr = Some("[::1]:8080".parse().unwrap());
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.ip_address, "localhost");

        let meta = meta_with_headers(&[("X-Forwarded-For", "127.0.0.1")]);
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.ip_address, "localhost");
    }

    #[test]
    fn test_reported_ip_is_last_resort() {
        let mut meta = RequestMeta::new("GET", "/");
        meta.reported_ip = Some("203.0.113.7".to_string());
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.ip_address, "203.0.113.7");
    }

    #[test]
    fn test_method_and_path_carried() {
        let meta = RequestMeta::new("POST", "/api/wallet/earn");
        let ctx = extract_context(Some(&meta), None);
        assert_eq!(ctx.method, "POST");
        assert_eq!(ctx.path, "/api/wallet/earn");
    }
}
