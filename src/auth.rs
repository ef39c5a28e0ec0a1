//! Session gate in front of the dashboard routes.
//!
//! Login, token exchange and session storage belong to the identity
//! collaborator. This crate only asks whether a request carries a session and
//! redirects to the collaborator's login/logout URLs.

use axum::http::{header, HeaderMap};

use crate::config::ServerConfig;

/// Opaque "is there an authenticated session" check
pub trait SessionGate: Send + Sync {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;
}

/// Lets every request through
#[derive(Debug, Clone, Default)]
pub struct OpenGate;

impl SessionGate for OpenGate {
    fn is_authenticated(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Authenticated iff the named session cookie is present and non-empty.
///
/// Validity of the cookie's contents is the identity collaborator's concern.
#[derive(Debug, Clone)]
pub struct CookieSessionGate {
    cookie_name: String,
}

impl CookieSessionGate {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }
}

impl SessionGate for CookieSessionGate {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == self.cookie_name && !value.is_empty())
    }
}

/// Gate selected by `[server].require_login`
pub fn gate_from_config(config: &ServerConfig) -> Box<dyn SessionGate> {
    if config.require_login {
        Box::new(CookieSessionGate::new(config.session_cookie.clone()))
    } else {
        Box::new(OpenGate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_open_gate() {
        assert!(OpenGate.is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn test_cookie_gate() {
        let gate = CookieSessionGate::new("session");

        assert!(gate.is_authenticated(&with_cookie("theme=dark; session=abc123")));
        assert!(!gate.is_authenticated(&with_cookie("session=")));
        assert!(!gate.is_authenticated(&with_cookie("other_session=abc")));
        assert!(!gate.is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn test_gate_from_config() {
        let mut config = ServerConfig::default();
        assert!(gate_from_config(&config).is_authenticated(&HeaderMap::new()));

        config.require_login = true;
        assert!(!gate_from_config(&config).is_authenticated(&HeaderMap::new()));
    }
}
