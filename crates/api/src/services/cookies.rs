//! Session cookie helper.
//!
//! Builds the `Set-Cookie` values for login and logout and reads the
//! session cookie back from request headers.

use axum::http::{header::COOKIE, header::SET_COOKIE, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Builds and reads the `HttpOnly` session cookie.
#[derive(Debug, Clone)]
pub struct CookieHelper {
    name: String,
    max_age_secs: i64,
    secure: bool,
    same_site: String,
    domain: String,
}

impl CookieHelper {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.ttl_secs,
            secure: config.secure,
            same_site: config.same_site.clone(),
            domain: config.domain.clone(),
        }
    }

    /// `Set-Cookie` value carrying a session token.
    pub fn build_session_cookie(&self, token: &str) -> String {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}",
            self.name, token, self.max_age_secs
        );
        self.with_attributes(cookie)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn build_clear_cookie(&self) -> String {
        let cookie = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name
        );
        self.with_attributes(cookie)
    }

    fn with_attributes(&self, mut cookie: String) -> String {
        cookie.push_str("; HttpOnly");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        if !self.domain.is_empty() {
            cookie.push_str(&format!("; Domain={}", self.domain));
        }
        cookie
    }

    pub fn add_session_cookie(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.build_session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    pub fn add_clear_cookie(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.build_clear_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Session token from the `Cookie` header, if present and non-empty.
    pub fn extract_session<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        extract_cookie(headers, &self.name).filter(|v| !v.is_empty())
    }
}

/// Value of cookie `name`. Every `Cookie` header is searched.
pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .map(str::trim)
        .find_map(|cookie| {
            let (cookie_name, value) = cookie.split_once('=')?;
            (cookie_name.trim() == name).then(|| value.trim())
        })
}
