//! Scope grammar.
//!
//! A granted capability is rendered as one scope entry:
//!
//! ```text
//! scope-entry = "scope:" service ":" privilege ["?" query-string]
//! ```
//!
//! `query-string` is `key=value` pairs joined by `&`. Keys and values are
//! percent-encoded: ASCII alphanumerics and `- _ . ! ~ * ' ( )` pass through,
//! every other UTF-8 byte becomes `%XX`. Entries are joined by a single space
//! to form the token's `scope` claim.
//!
//! - `scope:client:incoming?clientName=alice`
//! - `scope:client:outgoing?appSid=AP123&appParams=&clientName=alice`
//! - `scope:stream:subscribe?path=%2F2010-04-01%2FEvents&params=`

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{CapabilityError, CapabilityResult};

/// Literal prefix of every scope entry.
pub const SCOPE_PREFIX: &str = "scope";

/// Bytes escaped in query keys and values.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn escape(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT).to_string()
}

fn unescape(component: &str, scope: &str) -> CapabilityResult<String> {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| CapabilityError::InvalidScope {
            scope: scope.to_owned(),
            reason: format!("invalid percent-encoding: {e}"),
        })
}

/// Ordered query parameters of a scope entry.
///
/// Keys are unique. Order is insertion order and is preserved when rendered,
/// so the same grants always produce the same scope text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeParams(Vec<(String, String)>);

impl ScopeParams {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Set `key` to `value`.
    ///
    /// An existing key keeps its position and gets the new value; a new key is
    /// appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `key=value&key=value` with keys and values percent-encoded.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn parse_query(query: &str, scope: &str) -> CapabilityResult<Self> {
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(unescape(key, scope)?, unescape(value, scope)?);
        }
        Ok(params)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ScopeParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ScopeParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Parses a query string such as a decoded `appParams` or `params` value.
impl FromStr for ScopeParams {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_query(s, s)
    }
}

impl From<Vec<(String, String)>> for ScopeParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<std::collections::BTreeMap<String, String>> for ScopeParams {
    fn from(map: std::collections::BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// One granted capability: `service`, `privilege` and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeUri {
    service: String,
    privilege: String,
    params: ScopeParams,
}

impl ScopeUri {
    /// Create a scope entry.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::InvalidScope`] if `service` or `privilege`
    /// is empty or contains anything other than printable ASCII, or contains
    /// `:` or `?`.
    pub fn new(
        service: impl Into<String>,
        privilege: impl Into<String>,
        params: ScopeParams,
    ) -> CapabilityResult<Self> {
        let service = service.into();
        let privilege = privilege.into();
        let render = || format!("{SCOPE_PREFIX}:{service}:{privilege}");
        validate_identifier("service", &service).map_err(|reason| {
            CapabilityError::InvalidScope {
                scope: render(),
                reason,
            }
        })?;
        validate_identifier("privilege", &privilege).map_err(|reason| {
            CapabilityError::InvalidScope {
                scope: render(),
                reason,
            }
        })?;
        Ok(Self {
            service,
            privilege,
            params,
        })
    }

    /// Permission category, e.g. `client` or `stream`.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Action within the category, e.g. `incoming`.
    #[must_use]
    pub fn privilege(&self) -> &str {
        &self.privilege
    }

    /// Query parameters.
    #[must_use]
    pub fn params(&self) -> &ScopeParams {
        &self.params
    }

    /// Whether this entry is `service:privilege`.
    #[must_use]
    pub fn is(&self, service: &str, privilege: &str) -> bool {
        self.service == service && self.privilege == privilege
    }

    /// A copy of this entry with one extra (or replaced) parameter.
    #[must_use]
    pub fn with_param(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            service: self.service.clone(),
            privilege: self.privilege.clone(),
            params: self.params.clone().with(key, value),
        }
    }
}

fn validate_identifier(what: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{what} must not be empty"));
    }
    if let Some(c) = value
        .chars()
        .find(|c| !c.is_ascii_graphic() || matches!(c, ':' | '?'))
    {
        return Err(format!("{what} contains disallowed character {c:?}"));
    }
    Ok(())
}

impl fmt::Display for ScopeUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCOPE_PREFIX}:{}:{}", self.service, self.privilege)?;
        if !self.params.is_empty() {
            write!(f, "?{}", self.params.to_query_string())?;
        }
        Ok(())
    }
}

impl FromStr for ScopeUri {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CapabilityError::InvalidScope {
            scope: s.to_owned(),
            reason: reason.to_owned(),
        };

        let rest = s
            .strip_prefix(SCOPE_PREFIX)
            .and_then(|r| r.strip_prefix(':'))
            .ok_or_else(|| invalid("missing \"scope:\" prefix"))?;
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let (service, privilege) = path
            .split_once(':')
            .ok_or_else(|| invalid("expected service:privilege"))?;
        let params = match query {
            Some(query) => ScopeParams::parse_query(query, s)?,
            None => ScopeParams::new(),
        };

        Self::new(service, privilege, params).map_err(|e| match e {
            CapabilityError::InvalidScope { reason, .. } => invalid(&reason),
            other => other,
        })
    }
}
