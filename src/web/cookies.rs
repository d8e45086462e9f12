//! Session cookie handling.
//!
//! Tokens travel in two cookies: `AuthToken` for the access token and
//! `RefreshToken` for the refresh token. Both are cross-site (`SameSite=None`)
//! and therefore always `Secure`-capable.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use crate::auth::{IssuedToken, TokenPair};
use crate::config::CookieConfig;

/// Name of the access token cookie.
pub const AUTH_COOKIE: &str = "AuthToken";

/// Name of the refresh token cookie.
pub const REFRESH_COOKIE: &str = "RefreshToken";

/// Builds, reads and clears the session cookie pair.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    domain: Option<String>,
    secure: bool,
    http_only: bool,
}

impl SessionCookies {
    /// Create from configuration. An empty domain omits the attribute.
    pub fn from_config(config: &CookieConfig) -> Self {
        let domain = config.domain.trim();
        Self {
            domain: (!domain.is_empty()).then(|| domain.to_string()),
            secure: config.secure,
            http_only: config.http_only,
        }
    }

    fn build(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path("/")
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(SameSite::None)
            .max_age(max_age);
        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }

    fn token_cookie(&self, name: &'static str, token: &IssuedToken) -> Cookie<'static> {
        self.build(name, token.token.clone(), Duration::seconds(token.max_age_secs()))
    }

    fn expired_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.build(name, String::new(), Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }

    /// Set both session cookies.
    pub fn attach(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.token_cookie(AUTH_COOKIE, &tokens.access))
            .add(self.token_cookie(REFRESH_COOKIE, &tokens.refresh))
    }

    /// Set only the access token cookie.
    pub fn attach_access(&self, jar: CookieJar, access: &IssuedToken) -> CookieJar {
        jar.add(self.token_cookie(AUTH_COOKIE, access))
    }

    /// Replace both cookies with empty, already-expired ones.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.expired_cookie(AUTH_COOKIE))
            .add(self.expired_cookie(REFRESH_COOKIE))
    }

    /// Access token from the request, if present and non-empty.
    pub fn read_access(jar: &CookieJar) -> Option<&str> {
        read_non_empty(jar, AUTH_COOKIE)
    }

    /// Refresh token from the request, if present and non-empty.
    pub fn read_refresh(jar: &CookieJar) -> Option<&str> {
        read_non_empty(jar, REFRESH_COOKIE)
    }
}

fn read_non_empty<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(|c| c.value()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
    use chrono::Utc;

    fn cookies() -> SessionCookies {
        SessionCookies::from_config(&CookieConfig::default())
    }

    fn issued(token: &str, secs: i64) -> IssuedToken {
        let now = Utc::now();
        IssuedToken {
            token: token.to_string(),
            issued_at: now,
            expires_at: now + chrono::Duration::seconds(secs),
        }
    }

    #[test]
    fn test_attach_sets_both_cookies() {
        let pair = TokenPair {
            access: issued("access-jwt", 1800),
            refresh: issued("refresh-jwt", 604800),
        };
        let jar = cookies().attach(CookieJar::new(), &pair);

        let access = jar.get(AUTH_COOKIE).unwrap();
        assert_eq!(access.value(), "access-jwt");
        assert_eq!(access.max_age(), Some(Duration::seconds(1800)));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.domain(), Some("localhost"));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::None));

        let refresh = jar.get(REFRESH_COOKIE).unwrap();
        assert_eq!(refresh.value(), "refresh-jwt");
        assert_eq!(refresh.max_age(), Some(Duration::seconds(604800)));
    }

    #[test]
    fn test_attach_access_only() {
        let jar = cookies().attach_access(CookieJar::new(), &issued("access-jwt", 60));
        assert!(jar.get(AUTH_COOKIE).is_some());
        assert!(jar.get(REFRESH_COOKIE).is_none());
    }

    #[test]
    fn test_clear_expires_both() {
        let jar = cookies().clear(CookieJar::new());
        for name in [AUTH_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).unwrap();
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        }
        assert_eq!(SessionCookies::read_access(&jar), None);
        assert_eq!(SessionCookies::read_refresh(&jar), None);
    }

    #[test]
    fn test_empty_domain_is_omitted() {
        let config = CookieConfig {
            domain: "  ".to_string(),
            ..CookieConfig::default()
        };
        let jar = SessionCookies::from_config(&config).attach_access(CookieJar::new(), &issued("t", 60));
        assert_eq!(jar.get(AUTH_COOKIE).unwrap().domain(), None);
    }

    #[test]
    fn test_read_from_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("AuthToken=abc; RefreshToken=; other=1"),
        );
        let jar = CookieJar::from_headers(&headers);

        assert_eq!(SessionCookies::read_access(&jar), Some("abc"));
        assert_eq!(SessionCookies::read_refresh(&jar), None);
    }

    #[test]
    fn test_read_missing() {
        let jar = CookieJar::new();
        assert_eq!(SessionCookies::read_access(&jar), None);
        assert_eq!(SessionCookies::read_refresh(&jar), None);
    }
}
