//! folio core library — the request admission layer.
//!
//! Two independent gates sit in front of the folio HTTP handlers:
//!
//! - [`limiter`] — per-client sliding-window rate limiting ([`RateLimiter`]).
//! - [`auth`] — single-subject login and stateless signed tokens ([`Authenticator`]).
//!
//! Supporting modules:
//!
//! - [`clock`] — injectable time source ([`Clock`], [`SystemClock`], [`ManualClock`]).
//! - [`identity`] — [`ClientKey`] and [`Subject`] newtypes.
//! - [`duration`] — parsing of `"24h"`-style durations from configuration.
//! - [`error`] — unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod auth;
pub mod clock;
pub mod duration;
pub mod error;
pub mod identity;
pub mod limiter;

pub use auth::password::hash_password;
pub use auth::{Authenticator, Credential, IssuedToken};
pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::parse_duration;
pub use error::{CoreError, CoreResult};
pub use identity::{ClientKey, Subject};
pub use limiter::{Decision, RateLimiter};
