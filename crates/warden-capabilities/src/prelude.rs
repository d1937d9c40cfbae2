//! Prelude module - commonly used types for convenient import.
//!
//! Use `use warden_capabilities::prelude::*;` to import all essential types.

// Errors
pub use crate::{CapabilityError, CapabilityResult};

// Building
pub use crate::{Capability, ScopeParams, ScopeUri};

// Verification
pub use crate::{CapabilityClaims, CapabilityVerifier};

// Time
pub use crate::{Clock, FixedClock, SystemClock};
