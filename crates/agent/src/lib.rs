//! Web login agent for ticket-based single sign-on.
//!
//! This crate implements the application-agent side of a web login protocol:
//! a central login service authenticates users and hands the browser back to
//! the application with a signed response token; the agent verifies that
//! token against the service's published RSA keys and then maintains its own
//! HMAC-signed session ticket in a cookie. The server stores nothing.
//!
//! The engine itself performs no I/O. Callers snapshot each HTTP request
//! into a [`RequestView`], call [`Agent::authenticate`], and act on the
//! returned [`Decision`]: serve the page, follow a redirect, or report a
//! failure, applying any cookie operations either way.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use webauth_agent::{Agent, AgentConfig, Outcome, RequestView};
//! use webauth_keystore::DirKeyStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = DirKeyStore::open("/etc/webauth/keys")?;
//! let config = AgentConfig::builder()
//!     .hostname("app.example.org")
//!     .session_secret(std::env::var("SESSION_SECRET")?)
//!     .build();
//! let agent = Agent::new(config, Arc::new(keys));
//!
//! let request = RequestView::builder()
//!     .url("https://app.example.org/protected")
//!     .build();
//! match agent.authenticate(&request).outcome {
//!     Outcome::Authenticated(info) => println!("hello {}", info.principal),
//!     Outcome::Redirect { location } => println!("-> {location}"),
//!     Outcome::Failed { status, message } => println!("denied ({status}): {message}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod request;
pub mod status;
pub mod ticket;
pub mod token;
pub mod types;
pub mod wire;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::{
    AgentConfig, DEFAULT_AUTH_SERVICE, DEFAULT_CLOCK_SKEW, DEFAULT_COOKIE_NAME,
    DEFAULT_MAX_SESSION_LIFE, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_TIMEOUT_MESSAGE,
};
pub use engine::{Agent, PROBE_VALUE};
pub use error::{AuthError, Result};
pub use request::{AuthRequest, PROTOCOL_VERSION};
pub use status::Status;
pub use ticket::{SessionTicket, TICKET_VERSION};
pub use token::ResponseToken;
pub use types::{CookieOp, Decision, Outcome, RequestView, SessionInfo};
