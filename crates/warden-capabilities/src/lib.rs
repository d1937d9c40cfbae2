//! Warden Capabilities - Scoped, time-limited capability tokens.
//!
//! This crate provides:
//! - The scope grammar (`scope:<service>:<privilege>?<query>`)
//! - A builder that accumulates grants and signs them into a token
//! - Token verification with expiry checks
//!
//! # Security Model
//!
//! Every capability token is:
//! - Signed with HMAC-SHA256 under the issuer's shared secret
//! - Bound to a single issuer (`iss`)
//! - Time-bounded (`exp`)
//! - Verified in constant time
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use warden_capabilities::{Capability, CapabilityVerifier, FixedClock, ScopeParams};
//!
//! let clock = Arc::new(FixedClock::from_unix_millis(1_700_000_000_000).unwrap());
//!
//! let mut capability = Capability::with_clock("AC123", "s3cr3t", clock.clone());
//! capability
//!     .allow_client_incoming("alice")?
//!     .allow_event_stream(ScopeParams::from([("AccountSid", "AC123")]))?;
//! let token = capability.generate_token()?;
//!
//! let claims = CapabilityVerifier::new("s3cr3t").with_clock(clock).verify(&token)?;
//! assert_eq!(claims.exp, 1_700_003_600);
//! assert!(claims.grants("stream", "subscribe"));
//! # Ok::<(), warden_capabilities::CapabilityError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod capability;
mod claims;
mod clock;
mod error;
mod scope;
mod verifier;

pub use capability::{CAPABILITY_ALGORITHM, Capability, DEFAULT_TTL, EVENT_STREAM_PATH, names};
pub use claims::CapabilityClaims;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CapabilityError, CapabilityResult};
pub use scope::{SCOPE_PREFIX, ScopeParams, ScopeUri};
pub use verifier::CapabilityVerifier;
