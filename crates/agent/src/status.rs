//! WLS status code taxonomy.
//!
//! The login service reports outcomes as three-digit codes; the agent adds
//! two locally generated codes (600, 610). Remote denial codes are surfaced
//! to the caller with their fixed messages, unmodified.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of an authentication exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// 200 — authentication succeeded.
    Ok,
    /// 410 — the user cancelled authentication.
    Cancelled,
    /// 510 — no mutually acceptable authentication types.
    NoMutualAuthTypes,
    /// 520 — unsupported protocol version.
    UnsupportedVersion,
    /// 530 — parameter error in the authentication request.
    RequestParameterError,
    /// 540 — interaction with the user would be required.
    InteractionRequired,
    /// 550 — agent and login service clocks out of sync.
    ClocksOutOfSync,
    /// 560 — agent not authorized to use the login service.
    NotAuthorized,
    /// 570 — operation declined by the login service.
    Declined,
    /// 600 — locally detected protocol, configuration, or verification error.
    ProtocolError,
    /// 610 — the browser is not accepting session cookies.
    NoCookies,
}

impl Status {
    /// Numeric wire code.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Cancelled => 410,
            Self::NoMutualAuthTypes => 510,
            Self::UnsupportedVersion => 520,
            Self::RequestParameterError => 530,
            Self::InteractionRequired => 540,
            Self::ClocksOutOfSync => 550,
            Self::NotAuthorized => 560,
            Self::Declined => 570,
            Self::ProtocolError => 600,
            Self::NoCookies => 610,
        }
    }

    /// Map a numeric code to a status, if recognised.
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            410 => Some(Self::Cancelled),
            510 => Some(Self::NoMutualAuthTypes),
            520 => Some(Self::UnsupportedVersion),
            530 => Some(Self::RequestParameterError),
            540 => Some(Self::InteractionRequired),
            550 => Some(Self::ClocksOutOfSync),
            560 => Some(Self::NotAuthorized),
            570 => Some(Self::Declined),
            600 => Some(Self::ProtocolError),
            610 => Some(Self::NoCookies),
            _ => None,
        }
    }

    /// Parse a status from its wire text form.
    #[must_use]
    pub fn from_wire(text: &str) -> Option<Self> {
        text.parse::<u16>().ok().and_then(Self::from_code)
    }

    /// Fixed human-readable message for this status.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Cancelled => "Authentication cancelled at user's request",
            Self::NoMutualAuthTypes => {
                "No mutually acceptable types of authentication available"
            },
            Self::UnsupportedVersion => "Unsupported authentication protocol version",
            Self::RequestParameterError => "Parameter error in authentication request",
            Self::InteractionRequired => "Interaction with the user would be required",
            Self::ClocksOutOfSync => {
                "Web server and authentication server clocks out of sync"
            },
            Self::NotAuthorized => {
                "Web server not authorized to use the authentication service"
            },
            Self::Declined => "Operation declined by the authentication service",
            Self::ProtocolError => "Authentication protocol error",
            Self::NoCookies => "Browser is not accepting session cookie",
        }
    }

    /// Whether this status represents a successful authentication.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const ALL: &[Status] = &[
        Status::Ok,
        Status::Cancelled,
        Status::NoMutualAuthTypes,
        Status::UnsupportedVersion,
        Status::RequestParameterError,
        Status::InteractionRequired,
        Status::ClocksOutOfSync,
        Status::NotAuthorized,
        Status::Declined,
        Status::ProtocolError,
        Status::NoCookies,
    ];

    #[test]
    fn test_code_round_trip() {
        for &status in ALL {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_from_wire() {
        assert_eq!(Status::from_wire("200"), Some(Status::Ok));
        assert_eq!(Status::from_wire("410"), Some(Status::Cancelled));
        assert_eq!(Status::from_wire("999"), None);
        assert_eq!(Status::from_wire("abc"), None);
        assert_eq!(Status::from_wire(""), None);
    }

    #[test]
    fn test_remote_denial_messages_match_service_table() {
        assert_eq!(Status::Cancelled.message(), "Authentication cancelled at user's request");
        assert_eq!(
            Status::NoMutualAuthTypes.message(),
            "No mutually acceptable types of authentication available"
        );
        assert_eq!(
            Status::Declined.message(),
            "Operation declined by the authentication service"
        );
    }

    #[test]
    fn test_is_success() {
        assert!(Status::Ok.is_success());
        for &status in ALL.iter().filter(|s| **s != Status::Ok) {
            assert!(!status.is_success());
        }
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Status::NoCookies.to_string(), "610");
    }
}
