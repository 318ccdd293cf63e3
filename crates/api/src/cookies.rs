//! Credential transport: the `authToken` cookie.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::Duration;

pub const AUTH_COOKIE: &str = "authToken";

/// Attributes applied to the credential cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Adds `Secure`; enabled in production.
    pub secure: bool,
    pub max_age: Duration,
}

impl CookiePolicy {
    pub fn new(secure: bool, max_age: Duration) -> Self {
        Self { secure, max_age }
    }

    /// `Set-Cookie` value carrying a freshly issued credential.
    pub fn issue(&self, token: &str) -> String {
        let mut cookie = format!(
            "{AUTH_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
            self.max_age.num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// `Set-Cookie` value that removes the credential from the browser.
    pub fn clear(&self) -> String {
        let mut cookie = format!(
            "{AUTH_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Build a header map holding a single `Set-Cookie`.
///
/// Tokens are base64url and the attributes are ASCII, so the value is always
/// a valid header value; anything else yields an empty map.
pub fn set_cookie_header(value: String) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(&value) {
        headers.insert(header::SET_COOKIE, v);
    }
    headers
}

/// Credential from the request's `Cookie` header(s), if present and non-empty.
pub fn read_auth_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
