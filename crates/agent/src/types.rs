//! Request and decision value types.
//!
//! The engine is a pure function from an immutable [`RequestView`] to a
//! [`Decision`]. All actual I/O — following the redirect, writing cookie
//! headers — is performed by the hosting environment.

use std::collections::HashMap;

use bon::Builder;

use crate::status::Status;

/// Immutable view of the inbound HTTP request.
///
/// Cookie values are expected exactly as received on the wire; the engine
/// percent-decodes where the protocol requires it.
#[derive(Clone, Debug, Builder)]
pub struct RequestView {
    /// HTTP request method.
    #[builder(into, default = "GET".to_owned())]
    pub method: String,
    /// Full request URL (scheme, host, path, query).
    #[builder(into)]
    pub url: String,
    /// Cookies sent with the request, by name.
    #[builder(default)]
    pub cookies: HashMap<String, String>,
}

impl RequestView {
    /// Cookie value by name, if present.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// A cookie operation the caller must apply to its response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CookieOp {
    /// Set a session-scoped cookie.
    Set {
        /// Cookie name.
        name: String,
        /// Cookie value, already encoded for the wire.
        value: String,
        /// Path attribute.
        path: String,
        /// Domain attribute.
        domain: String,
        /// Whether to mark the cookie `Secure` (tied to request HTTPS).
        secure: bool,
    },
    /// Expire a cookie immediately.
    Clear {
        /// Cookie name.
        name: String,
        /// Path attribute.
        path: String,
        /// Domain attribute.
        domain: String,
        /// Whether the cookie was set `Secure`.
        secure: bool,
    },
}

impl CookieOp {
    /// The name this operation applies to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Set { name, .. } | Self::Clear { name, .. } => name,
        }
    }
}

/// The verified identity handed to the caller on terminal success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    /// Authenticated principal identifier.
    pub principal: String,
    /// Authentication type used.
    pub auth: String,
    /// Previous authentication types if satisfied via single sign-on
    /// (empty for interactive authentication).
    pub sso: String,
    /// Opaque application parameters from the original request.
    pub params: String,
    /// When the local session expires.
    pub expires: chrono::DateTime<chrono::Utc>,
}

impl SessionInfo {
    /// Whether the identity came from an existing login-service session.
    #[must_use]
    pub fn is_sso(&self) -> bool {
        !self.sso.is_empty()
    }
}

/// Terminal or redirect outcome of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The request carries a valid local session.
    Authenticated(SessionInfo),
    /// The browser must be redirected; authentication is still in flight.
    Redirect {
        /// Target URL.
        location: String,
    },
    /// Authentication failed; the request is unauthenticated.
    Failed {
        /// Wire status describing the failure.
        status: Status,
        /// Human-readable reason.
        message: String,
    },
}

/// What the caller should do with the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    /// The outcome to act on.
    pub outcome: Outcome,
    /// Cookie operations to apply, in order.
    pub cookies: Vec<CookieOp>,
}

impl Decision {
    pub(crate) fn new(outcome: Outcome) -> Self {
        Self { outcome, cookies: Vec::new() }
    }

    pub(crate) fn with_cookies(outcome: Outcome, cookies: Vec<CookieOp>) -> Self {
        Self { outcome, cookies }
    }

    /// Convenience accessor: the authenticated identity, if any.
    #[must_use]
    pub fn session(&self) -> Option<&SessionInfo> {
        match &self.outcome {
            Outcome::Authenticated(info) => Some(info),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_view_builder_defaults() {
        let req = RequestView::builder().url("https://app.example.org/").build();
        assert_eq!(req.method, "GET");
        assert!(req.cookies.is_empty());
        assert_eq!(req.cookie("anything"), None);
    }

    #[test]
    fn test_request_view_cookie_lookup() {
        let mut cookies = HashMap::new();
        cookies.insert("Session".to_owned(), "Test".to_owned());
        let req = RequestView::builder().url("https://x/").cookies(cookies).build();
        assert_eq!(req.cookie("Session"), Some("Test"));
    }

    #[test]
    fn test_cookie_op_name() {
        let op = CookieOp::Clear {
            name: "Session".into(),
            path: String::new(),
            domain: String::new(),
            secure: true,
        };
        assert_eq!(op.name(), "Session");
    }

    #[test]
    fn test_decision_session_accessor() {
        let info = SessionInfo {
            principal: "abc123".into(),
            auth: "pwd".into(),
            sso: String::new(),
            params: String::new(),
            expires: chrono::Utc::now(),
        };
        let decision = Decision::new(Outcome::Authenticated(info.clone()));
        assert_eq!(decision.session(), Some(&info));
        assert!(!info.is_sso());

        let failed = Decision::new(Outcome::Failed {
            status: Status::ProtocolError,
            message: "nope".into(),
        });
        assert!(failed.session().is_none());
    }
}
