//! Capability token claims.

use serde::{Deserialize, Serialize};

use crate::error::CapabilityResult;
use crate::scope::ScopeUri;

/// Payload carried by a capability token.
///
/// Field order is the signed key order: `scope`, `iss`, `exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityClaims {
    /// Space-joined scope entries.
    pub scope: String,
    /// Issuing account.
    pub iss: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl CapabilityClaims {
    /// Parse the scope claim into its entries.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidScope`](crate::CapabilityError::InvalidScope)
    /// if any entry does not follow the scope grammar.
    pub fn scopes(&self) -> CapabilityResult<Vec<ScopeUri>> {
        self.scope
            .split(' ')
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Whether the token grants `service:privilege`.
    ///
    /// Unparseable entries grant nothing.
    #[must_use]
    pub fn grants(&self, service: &str, privilege: &str) -> bool {
        self.scope
            .split(' ')
            .filter_map(|entry| entry.parse::<ScopeUri>().ok())
            .any(|scope| scope.is(service, privilege))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(scope: &str) -> CapabilityClaims {
        CapabilityClaims {
            scope: scope.to_owned(),
            iss: "AC123".to_owned(),
            exp: 0,
        }
    }

    #[test]
    fn test_scopes_parsed_in_order() {
        let c = claims("scope:client:incoming?clientName=bob scope:stream:subscribe");
        let scopes = c.scopes().unwrap();
        assert_eq!(scopes.len(), 2);
        assert!(scopes[0].is("client", "incoming"));
        assert_eq!(scopes[0].params().get("clientName"), Some("bob"));
        assert!(scopes[1].is("stream", "subscribe"));
    }

    #[test]
    fn test_empty_scope() {
        assert!(claims("").scopes().unwrap().is_empty());
        assert!(!claims("").grants("client", "incoming"));
    }

    #[test]
    fn test_grants() {
        let c = claims("scope:client:outgoing?appSid=AP1 garbage");
        assert!(c.grants("client", "outgoing"));
        assert!(!c.grants("client", "incoming"));
        assert!(c.scopes().is_err());
    }

    #[test]
    fn test_json_key_order() {
        let json = serde_json::to_string(&claims("scope:a:b")).unwrap();
        assert_eq!(json, r#"{"scope":"scope:a:b","iss":"AC123","exp":0}"#);
    }
}
