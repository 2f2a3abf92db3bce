//! Session cookie handling.
//!
//! The cookie value is the opaque session token; see
//! `pms_core::session` for how it is stored.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use pms_core::session::{SESSION_COOKIE, SESSION_TTL_DAYS};

/// Cookie lifetime in seconds (7 days).
pub const SESSION_MAX_AGE_SECS: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;

/// Extract the session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value issuing `token`.
pub fn issue(token: &str, secure: bool) -> String {
    build(token, SESSION_MAX_AGE_SECS, secure)
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear(secure: bool) -> String {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
