//! Authentication error types.
//!
//! Every error maps onto a wire [`Status`] via [`AuthError::status`]. The
//! engine converts errors into terminal `Failed` decisions; nothing is ever
//! retried internally, and absent an explicit successful verification the
//! request is treated as unauthenticated.

use thiserror::Error;
use webauth_keystore::KeystoreError;

use crate::status::Status;

/// Errors raised while validating tokens and tickets.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// A token, ticket, or encoded value could not be parsed.
    #[error("malformed data: {detail}")]
    Malformed {
        /// What failed to parse.
        detail: String,
    },

    /// A wire timestamp deviates from the canonical format.
    #[error("invalid timestamp: '{text}'")]
    InvalidTimestamp {
        /// The offending timestamp text.
        text: String,
    },

    /// The response token names a protocol version this agent does not speak.
    #[error("wrong protocol version in authentication service reply: '{version}'")]
    WrongProtocolVersion {
        /// Version string found in the token.
        version: String,
    },

    /// No trusted key is registered under the token's key id.
    #[error("no trusted key with id '{kid}'")]
    UnknownKey {
        /// The key id named by the token.
        kid: String,
    },

    /// The response token's asymmetric signature failed to verify.
    #[error("invalid authentication service reply signature")]
    InvalidTokenSignature,

    /// The session cookie's keyed-hash signature failed to verify.
    #[error("session cookie signature invalid")]
    SessionForged,

    /// The response token claims an issue time too far in the future.
    #[error("authentication service reply apparently issued in the future: {issue}")]
    FutureResponse {
        /// Issue timestamp from the token.
        issue: String,
    },

    /// The response token is older than the acceptance window allows.
    #[error("stale authentication service reply issued at {issue}")]
    StaleResponse {
        /// Issue timestamp from the token.
        issue: String,
    },

    /// The URL embedded in the response token is not this agent's URL.
    #[error("URL in response token does not match this agent: {token_url} != {agent_url}")]
    UrlMismatch {
        /// URL the token was issued for (query stripped).
        token_url: String,
        /// The agent's canonical URL (query stripped).
        agent_url: String,
    },

    /// The probe cookie was absent when the callback arrived, so a session
    /// cannot be established without looping.
    #[error("browser is not accepting session cookie")]
    CookiesNotAccepted,

    /// The login service reported a non-success status.
    #[error("authentication service reported {status}: {message}")]
    ServiceDenied {
        /// Status code reported by the service.
        status: Status,
        /// Fixed message for the code, plus any service-supplied detail.
        message: String,
    },

    /// Trusted key lookup failed.
    #[error("key store error: {0}")]
    Keystore(#[from] KeystoreError),
}

impl AuthError {
    /// Construct a [`AuthError::Malformed`].
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed { detail: detail.into() }
    }

    /// Construct an [`AuthError::InvalidTimestamp`].
    pub fn invalid_timestamp(text: impl Into<String>) -> Self {
        Self::InvalidTimestamp { text: text.into() }
    }

    /// Construct an [`AuthError::UnknownKey`].
    pub fn unknown_key(kid: impl Into<String>) -> Self {
        Self::UnknownKey { kid: kid.into() }
    }

    /// Construct an [`AuthError::UrlMismatch`].
    pub fn url_mismatch(token_url: impl Into<String>, agent_url: impl Into<String>) -> Self {
        Self::UrlMismatch { token_url: token_url.into(), agent_url: agent_url.into() }
    }

    /// Construct an [`AuthError::ServiceDenied`] from a denial status,
    /// appending any service-supplied detail to the fixed message.
    pub fn service_denied(status: Status, detail: &str) -> Self {
        let message = if detail.is_empty() {
            status.message().to_owned()
        } else {
            format!("{}: {detail}", status.message())
        };
        Self::ServiceDenied { status, message }
    }

    /// The wire status this error surfaces as.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::CookiesNotAccepted => Status::NoCookies,
            Self::ServiceDenied { status, .. } => *status,
            _ => Status::ProtocolError,
        }
    }
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::malformed("expected 13 fields");
        assert_eq!(err.to_string(), "malformed data: expected 13 fields");

        let err = AuthError::unknown_key("901");
        assert_eq!(err.to_string(), "no trusted key with id '901'");
    }

    #[test]
    fn test_status_mapping_local_errors() {
        assert_eq!(AuthError::SessionForged.status(), Status::ProtocolError);
        assert_eq!(AuthError::InvalidTokenSignature.status(), Status::ProtocolError);
        assert_eq!(AuthError::invalid_timestamp("x").status(), Status::ProtocolError);
        assert_eq!(AuthError::CookiesNotAccepted.status(), Status::NoCookies);
    }

    #[test]
    fn test_service_denied_keeps_remote_status() {
        let err = AuthError::service_denied(Status::Cancelled, "");
        assert_eq!(err.status(), Status::Cancelled);
        assert_eq!(
            err.to_string(),
            "authentication service reported 410: Authentication cancelled at user's request"
        );
    }

    #[test]
    fn test_service_denied_appends_detail() {
        let err = AuthError::service_denied(Status::Declined, "contact the administrator");
        assert!(err.to_string().contains("contact the administrator"));
    }

    #[test]
    fn test_keystore_error_preserves_source_chain() {
        use std::error::Error;

        let inner = KeystoreError::InvalidKeyId { kid: "../2".into(), reason: "illegal".into() };
        let err: AuthError = inner.into();
        assert!(err.source().is_some());
        assert_eq!(err.status(), Status::ProtocolError);
    }
}
