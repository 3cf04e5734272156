//! The authentication engine.
//!
//! [`Agent::authenticate_at`] is a pure function from a request snapshot and
//! a clock reading to a [`Decision`]; no I/O happens here. Each call works
//! through three stages in order:
//!
//! 1. a presented session cookie, if valid, answers the request outright;
//! 2. a `WLS-Response` callback from the login service is verified and
//!    converted into a fresh session cookie plus a redirect that strips the
//!    token from the URL;
//! 3. otherwise the browser is redirected to the login service, with a probe
//!    cookie set so cookie support can be checked when the callback returns.
//!
//! Absent an explicit successful verification, the request is unauthenticated.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use url::Url;
use webauth_keystore::TrustedKeyStore;

use crate::{
    config::AgentConfig,
    crypto,
    error::{AuthError, Result},
    request::{AuthRequest, PROTOCOL_VERSION},
    status::Status,
    ticket::SessionTicket,
    token::ResponseToken,
    types::{CookieOp, Decision, Outcome, RequestView, SessionInfo},
    wire,
};

/// Sentinel value of the probe cookie set before redirecting to the login
/// service. Anything else in the session cookie is treated as a ticket.
pub const PROBE_VALUE: &str = "Test";

/// Query prefix carrying the login service's response token.
const WLS_RESPONSE_PREFIX: &str = "WLS-Response=";

/// Suffix appended to the cookie name over HTTPS, keeping secure and
/// insecure sessions on the same host apart.
const SECURE_COOKIE_SUFFIX: &str = "-S";

/// A configured authentication agent.
///
/// Cheap to share: the config is immutable and the key store is behind an
/// `Arc`. One agent serves any number of concurrent requests.
pub struct Agent {
    config: AgentConfig,
    keys: Arc<dyn TrustedKeyStore>,
}

/// What a presented session cookie turned out to hold.
enum SessionState {
    /// A valid, unexpired success ticket.
    Current(SessionInfo),
    /// A valid ticket whose window has closed.
    Expired,
    /// A valid ticket recording an earlier failure.
    StoredFailure {
        status: Status,
        message: String,
    },
}

/// Request URL decomposed once, up front.
struct UrlParts {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: Option<String>,
}

impl UrlParts {
    fn parse(raw: &str) -> Result<Self> {
        let parsed =
            Url::parse(raw).map_err(|e| AuthError::malformed(format!("bad request URL: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AuthError::malformed("request URL has no host"))?
            .to_owned();
        Ok(Self {
            scheme: parsed.scheme().to_owned(),
            host,
            port: parsed.port(),
            path: parsed.path().to_owned(),
            query: parsed.query().map(str::to_owned),
        })
    }

    fn is_https(&self) -> bool {
        self.scheme == "https"
    }
}

impl Agent {
    /// Create an agent from its configuration and a store of trusted
    /// login-service keys.
    pub fn new(config: AgentConfig, keys: Arc<dyn TrustedKeyStore>) -> Self {
        Self { config, keys }
    }

    /// The configuration this agent was built with.
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Authenticate against the current system clock.
    #[must_use]
    pub fn authenticate(&self, request: &RequestView) -> Decision {
        self.authenticate_at(request, Utc::now())
    }

    /// Authenticate `request` as of `now`.
    ///
    /// Every code path ends in a [`Decision`]; errors become terminal
    /// `Failed` outcomes rather than surfacing to the caller.
    #[must_use]
    pub fn authenticate_at(&self, request: &RequestView, now: DateTime<Utc>) -> Decision {
        let parts = match UrlParts::parse(&request.url) {
            Ok(parts) => parts,
            Err(err) => return fail(err, Vec::new()),
        };
        if !request.method.eq_ignore_ascii_case("GET") {
            // The authentication round trip only preserves the URL, so any
            // request body is lost. Proceed, but leave a trace.
            tracing::warn!(
                method = %request.method,
                "authenticating a non-GET request; body parameters will not survive the redirect"
            );
        }

        let cookie_name = self.full_cookie_name(parts.is_https());
        let mut cookies = Vec::new();
        let mut pending_msg = None;

        // Stage 1: an existing session cookie.
        if self.config.manage_sessions
            && let Some(raw) = request.cookie(&cookie_name)
            && raw != PROBE_VALUE
        {
            match self.check_session(raw, now) {
                Ok(SessionState::Current(info)) => {
                    tracing::debug!(principal = %info.principal, "request carries a current session");
                    return Decision::new(Outcome::Authenticated(info));
                }
                Ok(SessionState::StoredFailure { status, message }) => {
                    push_cookie(&mut cookies, self.clear_op(&cookie_name, parts.is_https()));
                    return Decision::with_cookies(Outcome::Failed { status, message }, cookies);
                }
                Ok(SessionState::Expired) => {
                    tracing::debug!("session expired; requesting fresh authentication");
                    push_cookie(&mut cookies, self.clear_op(&cookie_name, parts.is_https()));
                    pending_msg = Some(self.config.timeout_message.clone());
                }
                Err(err) => {
                    // A cookie that fails verification is terminal. Falling
                    // through to a fresh redirect would let an attacker force
                    // reauthentication loops with garbage cookies.
                    tracing::warn!(error = %err, "rejecting presented session cookie");
                    return fail(err, cookies);
                }
            }
        }

        // Stage 2: a response token returning from the login service.
        if let Some(query) = parts.query.as_deref()
            && let Some(token_text) = query.strip_prefix(WLS_RESPONSE_PREFIX)
        {
            let probe_ok = request.cookie(&cookie_name) == Some(PROBE_VALUE);
            return match self.check_callback(token_text, &parts, probe_ok, now) {
                Ok((token, expire)) => {
                    let info = SessionInfo {
                        principal: token.principal.clone(),
                        auth: token.auth.clone(),
                        sso: token.sso.clone(),
                        params: token.params.clone(),
                        expires: expire,
                    };
                    if !self.config.manage_sessions {
                        return Decision::with_cookies(Outcome::Authenticated(info), cookies);
                    }
                    let ticket = SessionTicket::builder()
                        .status(Status::Ok)
                        .msg(token.msg.clone())
                        .issue(now)
                        .expire(expire)
                        .id(token.id.clone())
                        .principal(token.principal.clone())
                        .auth(token.auth.clone())
                        .sso(token.sso.clone())
                        .params(token.params.clone())
                        .build();
                    let value = wire::percent_encode(&ticket.encode(&self.config.session_secret));
                    push_cookie(&mut cookies, self.set_op(&cookie_name, value, parts.is_https()));
                    tracing::info!(
                        principal = %token.principal,
                        sso = token.is_sso(),
                        "authentication established; redirecting to strip the response token"
                    );
                    // Redirecting to the token's embedded URL removes the
                    // WLS-Response parameter from the address bar and history.
                    Decision::with_cookies(Outcome::Redirect { location: token.url }, cookies)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "login service response rejected");
                    fail(err, cookies)
                }
            };
        }

        // Stage 3: send the browser to the login service.
        if !parts.host.eq_ignore_ascii_case(&self.config.hostname) {
            // Bounce onto the canonical hostname first so the cookie and the
            // return URL agree on a host.
            let location = self.canonical_url(&parts, true);
            tracing::debug!(%location, "redirecting to canonical hostname");
            return Decision::with_cookies(Outcome::Redirect { location }, cookies);
        }
        if self.config.manage_sessions {
            push_cookie(
                &mut cookies,
                self.set_op(&cookie_name, PROBE_VALUE.to_owned(), parts.is_https()),
            );
        }
        let auth_request = AuthRequest::builder()
            .url(self.canonical_url(&parts, true))
            .maybe_description(self.config.description.clone())
            .maybe_aauth(self.config.aauth.clone())
            .maybe_iact(self.config.iact)
            .maybe_params(self.config.params.clone())
            .maybe_msg(pending_msg)
            .date(now)
            .skew(self.config.clock_skew)
            .fail(self.config.fail)
            .build();
        let location = auth_request.redirect_url(&self.config.auth_service);
        tracing::debug!("redirecting to login service");
        Decision::with_cookies(Outcome::Redirect { location }, cookies)
    }

    /// Cookie operations that end the local session.
    ///
    /// Only the local ticket is destroyed; the user may still hold a live
    /// single-sign-on session at the login service itself.
    #[must_use]
    pub fn logout(&self, request: &RequestView) -> Vec<CookieOp> {
        // An unparsable URL gets the insecure cookie name, same as any
        // non-HTTPS request.
        let https = UrlParts::parse(&request.url).is_ok_and(|parts| parts.is_https());
        vec![self.clear_op(&self.full_cookie_name(https), https)]
    }

    /// Validate a presented (non-probe) session cookie.
    fn check_session(&self, raw: &str, now: DateTime<Utc>) -> Result<SessionState> {
        let decoded = wire::percent_decode(raw)?;
        let ticket = SessionTicket::decode_verified(&decoded, &self.config.session_secret)?;
        // Expiry before stored status: an out-of-window ticket restarts
        // authentication whatever outcome it recorded.
        if !ticket.is_current(now) {
            return Ok(SessionState::Expired);
        }
        if !ticket.status.is_success() {
            let message = if ticket.msg.is_empty() {
                ticket.status.message().to_owned()
            } else {
                ticket.msg.clone()
            };
            return Ok(SessionState::StoredFailure { status: ticket.status, message });
        }
        Ok(SessionState::Current(SessionInfo {
            principal: ticket.principal,
            auth: ticket.auth,
            sso: ticket.sso,
            params: ticket.params,
            expires: ticket.expire,
        }))
    }

    /// Verify a response token end to end.
    ///
    /// Returns the token plus the computed session expiry. Check order: the
    /// version and status come first because denial tokens are unsigned; all
    /// remaining fields are acted on only after the signature verifies.
    fn check_callback(
        &self,
        token_text: &str,
        parts: &UrlParts,
        probe_ok: bool,
        now: DateTime<Utc>,
    ) -> Result<(ResponseToken, DateTime<Utc>)> {
        let decoded = wire::percent_decode(token_text)?;
        let token = ResponseToken::parse(&decoded)?;
        tracing::debug!(id = %token.id, status = %token.status, "checking login service response");

        if token.ver != PROTOCOL_VERSION {
            return Err(AuthError::WrongProtocolVersion { version: token.ver });
        }
        let status = token.status().ok_or_else(|| {
            AuthError::malformed(format!("unrecognised status '{}'", token.status))
        })?;
        if !status.is_success() {
            return Err(AuthError::service_denied(status, &token.msg));
        }

        crypto::verify_wls_signature(&token.signed_text(), &token.sig, &token.kid, &*self.keys)?;

        let issue = token.issue_time()?;
        let skew = seconds(self.config.clock_skew);
        if issue > now + skew {
            return Err(AuthError::FutureResponse { issue: token.issue });
        }
        if issue < now - seconds(self.config.response_timeout) - skew {
            return Err(AuthError::StaleResponse { issue: token.issue });
        }

        let agent_base = self.canonical_url(parts, false);
        let token_base = strip_query(&token.url);
        if token_base != agent_base {
            return Err(AuthError::url_mismatch(token_base, agent_base));
        }

        // The probe must hold the exact sentinel. Anything else, including a
        // leftover expired ticket, does not prove the browser will store the
        // session cookie about to be issued.
        if self.config.manage_sessions && !probe_ok {
            return Err(AuthError::CookiesNotAccepted);
        }

        let life = token
            .life_seconds()
            .map_or(self.config.max_session_life, |granted| {
                granted.min(self.config.max_session_life)
            });
        Ok((token, now + seconds(life)))
    }

    /// Session cookie name, suffixed over HTTPS.
    fn full_cookie_name(&self, https: bool) -> String {
        if https {
            format!("{}{SECURE_COOKIE_SUFFIX}", self.config.cookie_name)
        } else {
            self.config.cookie_name.clone()
        }
    }

    /// This agent's URL for the request, rebuilt on the configured hostname.
    fn canonical_url(&self, parts: &UrlParts, with_query: bool) -> String {
        let mut url = format!("{}://{}", parts.scheme, self.config.hostname);
        if let Some(port) = parts.port {
            url.push(':');
            url.push_str(&port.to_string());
        }
        url.push_str(&parts.path);
        if with_query && let Some(query) = &parts.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn set_op(&self, name: &str, value: String, secure: bool) -> CookieOp {
        CookieOp::Set {
            name: name.to_owned(),
            value,
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            secure,
        }
    }

    fn clear_op(&self, name: &str, secure: bool) -> CookieOp {
        CookieOp::Clear {
            name: name.to_owned(),
            path: self.config.cookie_path.clone(),
            domain: self.config.cookie_domain.clone(),
            secure,
        }
    }
}

fn fail(err: AuthError, cookies: Vec<CookieOp>) -> Decision {
    Decision::with_cookies(
        Outcome::Failed { status: err.status(), message: err.to_string() },
        cookies,
    )
}

/// Append a cookie operation, dropping any earlier operation on the same
/// name. The last write wins, as it would on a real response.
fn push_cookie(ops: &mut Vec<CookieOp>, op: CookieOp) {
    ops.retain(|existing| existing.name() != op.name());
    ops.push(op);
}

fn strip_query(url: &str) -> &str {
    url.find('?').map_or(url, |i| &url[..i])
}

fn seconds(n: u64) -> Duration {
    Duration::seconds(i64::try_from(n).unwrap_or(i64::MAX))
}
