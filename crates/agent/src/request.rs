//! Outbound authentication requests.
//!
//! An [`AuthRequest`] exists only long enough to render the redirect URL that
//! sends the user's browser to the login service. The issue timestamp and
//! declared clock-skew tolerance let the service detect local clock drift.

use bon::Builder;
use chrono::{DateTime, Utc};

use crate::wire;

/// Protocol version this agent speaks.
pub const PROTOCOL_VERSION: &str = "1";

/// Parameters for one redirect to the login service. Never persisted.
#[derive(Clone, Debug, Builder)]
pub struct AuthRequest {
    /// URL the service should return the user to.
    #[builder(into)]
    pub url: String,
    /// Description of the resource requesting authentication.
    pub description: Option<String>,
    /// Acceptable authentication types, comma-separated.
    pub aauth: Option<String>,
    /// Whether the service may interact with the user (`None` leaves the
    /// choice to the service).
    pub iact: Option<bool>,
    /// Opaque application parameters, echoed back in the response token.
    pub params: Option<String>,
    /// Message to show the user, e.g. why a fresh logon is needed.
    pub msg: Option<String>,
    /// When this request was issued.
    pub date: DateTime<Utc>,
    /// Clock-skew tolerance declared to the service, in seconds.
    pub skew: u64,
    /// Ask the service to report failures itself rather than redirecting
    /// back with an error status.
    #[builder(default)]
    pub fail: bool,
}

impl AuthRequest {
    /// Render the full redirect URL for `auth_service`.
    ///
    /// Parameter order and encoding are fixed: `ver`, `url`, then the
    /// optional parameters, then `date`, `skew`, and `fail`.
    #[must_use]
    pub fn redirect_url(&self, auth_service: &str) -> String {
        let mut dest = format!(
            "{auth_service}?ver={PROTOCOL_VERSION}&url={}",
            wire::percent_encode(&self.url)
        );
        if let Some(desc) = &self.description {
            dest.push_str("&desc=");
            dest.push_str(&wire::percent_encode(desc));
        }
        if let Some(aauth) = &self.aauth {
            dest.push_str("&aauth=");
            dest.push_str(&wire::percent_encode(aauth));
        }
        if let Some(iact) = self.iact {
            dest.push_str("&iact=");
            dest.push_str(if iact { "yes" } else { "no" });
        }
        if let Some(params) = &self.params {
            dest.push_str("&params=");
            dest.push_str(&wire::percent_encode(params));
        }
        if let Some(msg) = &self.msg {
            dest.push_str("&msg=");
            dest.push_str(&wire::percent_encode(msg));
        }
        dest.push_str("&date=");
        dest.push_str(&wire::percent_encode(&wire::format_timestamp(self.date)));
        dest.push_str("&skew=");
        dest.push_str(&self.skew.to_string());
        if self.fail {
            dest.push_str("&fail=yes");
        }
        dest
    }
}
