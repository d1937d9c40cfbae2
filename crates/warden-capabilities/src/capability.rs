//! Capability builder.
//!
//! Accumulates grants for one issuer and signs them into a token. Grants are
//! stored exactly as requested; the incoming client name is applied to
//! outgoing grants only while rendering, so the order in which incoming and
//! outgoing grants were added does not matter.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;
use warden_crypto::{Algorithm, SigningSecret, jwt};

use crate::claims::CapabilityClaims;
use crate::clock::{Clock, SystemClock};
use crate::error::{CapabilityError, CapabilityResult};
use crate::scope::{ScopeParams, ScopeUri};

/// Token lifetime used by [`Capability::generate_token`].
pub const DEFAULT_TTL: Duration = Duration::seconds(3600);

/// Event subscription endpoint granted by [`Capability::allow_event_stream`].
pub const EVENT_STREAM_PATH: &str = "/2010-04-01/Events";

/// Algorithm used for every capability token.
pub const CAPABILITY_ALGORITHM: Algorithm = Algorithm::Hs256;

/// Service and privilege names.
pub mod names {
    /// Client connection service.
    pub const CLIENT: &str = "client";
    /// Event stream service.
    pub const STREAM: &str = "stream";
    /// Receive client connections.
    pub const INCOMING: &str = "incoming";
    /// Place outbound calls through an application.
    pub const OUTGOING: &str = "outgoing";
    /// Subscribe to the event stream.
    pub const SUBSCRIBE: &str = "subscribe";

    /// Incoming client name / injected outgoing client identity.
    pub const CLIENT_NAME: &str = "clientName";
    /// Outgoing application id.
    pub const APP_SID: &str = "appSid";
    /// Outgoing application parameters, query-encoded.
    pub const APP_PARAMS: &str = "appParams";
    /// Event stream endpoint path.
    pub const PATH: &str = "path";
    /// Event stream filters, query-encoded.
    pub const PARAMS: &str = "params";
}

use names::{
    APP_PARAMS, APP_SID, CLIENT, CLIENT_NAME, INCOMING, OUTGOING, PARAMS, PATH, STREAM, SUBSCRIBE,
};

/// Builder for capability tokens.
///
/// Not meant to be shared between threads while grants are added; build one
/// per request or guard it externally. [`generate_token`](Self::generate_token)
/// only reads the accumulated state and may be called any number of times.
///
/// # Example
///
/// ```
/// use warden_capabilities::{Capability, ScopeParams};
///
/// let mut capability = Capability::new("AC123", "s3cr3t");
/// capability
///     .allow_client_incoming("alice")?
///     .allow_client_outgoing("AP456", ScopeParams::new())?;
///
/// assert_eq!(
///     capability.scope_strings(),
///     vec![
///         "scope:client:incoming?clientName=alice",
///         "scope:client:outgoing?appSid=AP456&appParams=&clientName=alice",
///     ]
/// );
///
/// let token = capability.generate_token()?;
/// assert_eq!(token.split('.').count(), 3);
/// # Ok::<(), warden_capabilities::CapabilityError>(())
/// ```
#[derive(Debug)]
pub struct Capability {
    issuer: String,
    secret: SigningSecret,
    scopes: Vec<ScopeUri>,
    client_name: Option<String>,
    clock: Arc<dyn Clock>,
}

impl Capability {
    /// Create a builder for `issuer`, signing with `secret`.
    #[must_use]
    pub fn new(issuer: impl Into<String>, secret: impl Into<SigningSecret>) -> Self {
        Self::with_clock(issuer, secret, Arc::new(SystemClock))
    }

    /// Create a builder that reads the time from `clock`.
    #[must_use]
    pub fn with_clock(
        issuer: impl Into<String>,
        secret: impl Into<SigningSecret>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            secret: secret.into(),
            scopes: Vec::new(),
            client_name: None,
            clock,
        }
    }

    /// The issuer placed in the `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The incoming client name, if one was granted.
    #[must_use]
    pub fn client_name(&self) -> Option<&str> {
        self.client_name.as_deref()
    }

    /// Grants in the order they were added, as stored (no injection).
    #[must_use]
    pub fn scopes(&self) -> &[ScopeUri] {
        &self.scopes
    }

    /// Allow the bearer to receive client connections addressed to `client_name`.
    ///
    /// The name is also attached to every outgoing grant when rendering.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::InvalidClientName`] if the name is empty or not
    ///   ASCII alphanumeric.
    /// - [`CapabilityError::ClientNameAlreadySet`] if an incoming grant was
    ///   already added to this builder.
    pub fn allow_client_incoming(&mut self, client_name: &str) -> CapabilityResult<&mut Self> {
        validate_client_name(client_name)?;
        if let Some(existing) = &self.client_name {
            return Err(CapabilityError::ClientNameAlreadySet {
                existing: existing.clone(),
            });
        }

        let scope = ScopeUri::new(
            CLIENT,
            INCOMING,
            ScopeParams::new().with(CLIENT_NAME, client_name),
        )?;
        self.client_name = Some(client_name.to_owned());
        self.scopes.push(scope);
        Ok(self)
    }

    /// Allow the bearer to place outbound calls through application `app_sid`.
    ///
    /// `app_params` are query-encoded into a single `appParams` value.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidApplicationId`] if `app_sid` is empty.
    pub fn allow_client_outgoing(
        &mut self,
        app_sid: &str,
        app_params: impl Into<ScopeParams>,
    ) -> CapabilityResult<&mut Self> {
        if app_sid.is_empty() {
            return Err(CapabilityError::InvalidApplicationId);
        }

        let params = ScopeParams::new()
            .with(APP_SID, app_sid)
            .with(APP_PARAMS, app_params.into().to_query_string());
        self.scopes.push(ScopeUri::new(CLIENT, OUTGOING, params)?);
        Ok(self)
    }

    /// Allow the bearer to subscribe to the event stream, narrowed by `filters`.
    ///
    /// # Errors
    ///
    /// Infallible for the fixed service and privilege; the `Result` keeps
    /// the grant methods uniform.
    pub fn allow_event_stream(
        &mut self,
        filters: impl Into<ScopeParams>,
    ) -> CapabilityResult<&mut Self> {
        let params = ScopeParams::new()
            .with(PATH, EVENT_STREAM_PATH)
            .with(PARAMS, filters.into().to_query_string());
        self.scopes.push(ScopeUri::new(STREAM, SUBSCRIBE, params)?);
        Ok(self)
    }

    /// Render one grant as it will appear in the token.
    fn render(&self, scope: &ScopeUri) -> String {
        match &self.client_name {
            Some(name) if scope.is(CLIENT, OUTGOING) => {
                scope.with_param(CLIENT_NAME, name.as_str()).to_string()
            },
            _ => scope.to_string(),
        }
    }

    /// Every grant rendered, in grant order.
    #[must_use]
    pub fn scope_strings(&self) -> Vec<String> {
        self.scopes.iter().map(|scope| self.render(scope)).collect()
    }

    /// The `scope` claim: rendered grants joined by single spaces.
    #[must_use]
    pub fn render_scope(&self) -> String {
        self.scope_strings().join(" ")
    }

    /// Expiry for a token issued now with lifetime `ttl`.
    ///
    /// `floor(now + ttl + 0.5s)`, computed at millisecond precision.
    #[must_use]
    pub fn expiry(&self, ttl: Duration) -> i64 {
        self.clock
            .now()
            .timestamp_millis()
            .saturating_add(ttl.num_milliseconds())
            .saturating_add(500)
            .div_euclid(1000)
    }

    /// Claims for a token issued now with lifetime `ttl`.
    #[must_use]
    pub fn claims(&self, ttl: Duration) -> CapabilityClaims {
        CapabilityClaims {
            scope: self.render_scope(),
            iss: self.issuer.clone(),
            exp: self.expiry(ttl),
        }
    }

    /// Sign the current grants into a token valid for [`DEFAULT_TTL`].
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Crypto`] if the codec fails.
    pub fn generate_token(&self) -> CapabilityResult<String> {
        self.generate_token_with_ttl(DEFAULT_TTL)
    }

    /// Sign the current grants into a token valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Crypto`] if the codec fails.
    pub fn generate_token_with_ttl(&self, ttl: Duration) -> CapabilityResult<String> {
        let claims = self.claims(ttl);
        let token = jwt::encode(&claims, &self.secret, CAPABILITY_ALGORITHM)?;
        debug!(
            issuer = %self.issuer,
            grants = self.scopes.len(),
            exp = claims.exp,
            "generated capability token"
        );
        Ok(token)
    }
}

fn validate_client_name(name: &str) -> CapabilityResult<()> {
    let invalid = |reason: &str| CapabilityError::InvalidClientName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };
    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("only alphanumeric characters are allowed"));
    }
    Ok(())
}
