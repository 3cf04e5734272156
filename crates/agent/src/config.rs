//! Agent configuration.
//!
//! One explicit, immutable struct constructed at startup and shared by
//! reference with the engine. There is no ambient global: the same process
//! can run differently configured agents side by side.

use bon::Builder;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Default login service endpoint.
pub const DEFAULT_AUTH_SERVICE: &str = "https://raven.cam.ac.uk/auth/authenticate.html";
/// Default session cookie name. An `-S` suffix is appended over HTTPS.
pub const DEFAULT_COOKIE_NAME: &str = "Ucam-WebAuth-Session";
/// Default message carried to the login service when a session times out.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "your logon to the site has expired";
/// Default acceptance window for response tokens, in seconds.
pub const DEFAULT_RESPONSE_TIMEOUT: u64 = 30;
/// Default tolerated clock drift between agent and service, in seconds.
pub const DEFAULT_CLOCK_SKEW: u64 = 5;
/// Default upper bound on local session lifetime, in seconds.
pub const DEFAULT_MAX_SESSION_LIFE: u64 = 2 * 60 * 60;

/// Immutable configuration for an [`Agent`](crate::engine::Agent).
///
/// `hostname` and `session_secret` have no defaults and must be supplied:
/// the hostname is deliberately never taken from a request header, and a
/// session without a signing secret would be worthless.
#[derive(Clone, Debug, Serialize, Deserialize, Builder)]
pub struct AgentConfig {
    /// Canonical hostname of this agent. Compared case-insensitively against
    /// request hosts and embedded in return URLs.
    #[builder(into)]
    pub hostname: String,

    /// Secret used to HMAC-sign session tickets. Zeroed from memory on drop.
    #[builder(into)]
    pub session_secret: Zeroizing<String>,

    /// Login service endpoint to redirect unauthenticated users to.
    #[builder(into, default = DEFAULT_AUTH_SERVICE.to_owned())]
    pub auth_service: String,

    /// How long a response token stays acceptable after issue, in seconds.
    #[builder(default = DEFAULT_RESPONSE_TIMEOUT)]
    pub response_timeout: u64,

    /// Tolerated clock drift in seconds, applied to both window edges.
    #[builder(default = DEFAULT_CLOCK_SKEW)]
    pub clock_skew: u64,

    /// Upper bound on session lifetime in seconds; a shorter service-granted
    /// lifetime wins.
    #[builder(default = DEFAULT_MAX_SESSION_LIFE)]
    pub max_session_life: u64,

    /// Base cookie name for the probe and session cookies.
    #[builder(into, default = DEFAULT_COOKIE_NAME.to_owned())]
    pub cookie_name: String,

    /// Cookie path attribute.
    #[builder(into, default)]
    pub cookie_path: String,

    /// Cookie domain attribute.
    #[builder(into, default)]
    pub cookie_domain: String,

    /// Message shown via the login service after a local session expires.
    #[builder(into, default = DEFAULT_TIMEOUT_MESSAGE.to_owned())]
    pub timeout_message: String,

    /// Description of this site, shown on the login page.
    pub description: Option<String>,

    /// Acceptable authentication types requested from the service.
    pub aauth: Option<String>,

    /// Whether the service may interact with the user.
    pub iact: Option<bool>,

    /// Opaque application parameters echoed through the protocol.
    pub params: Option<String>,

    /// Ask the service to report failures itself instead of redirecting
    /// back with an error status.
    #[builder(default)]
    pub fail: bool,

    /// When false, the engine verifies callbacks and reports the principal
    /// directly without issuing any cookies; the caller owns session state.
    #[builder(default = true)]
    pub manage_sessions: bool,
}
