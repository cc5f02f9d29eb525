//! # URN
//!
//! Canonical `namespace.id` identity derived from a client certificate
//! common name. Used as the key for every registry and subscription lookup
//! and as the message-bus routing key.

use crate::errors::IdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a service or consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Urn {
    /// Namespace the client belongs to.
    pub namespace: String,
    /// Client identifier within the namespace.
    pub id: String,
}

impl Urn {
    /// Build a URN from already-trusted parts.
    pub fn new(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Derive a URN from a certificate common name.
    ///
    /// Accepts `<namespace>.<id>` and `<namespace>.<id>.<suffix>`; only the
    /// first two dot-delimited segments are kept. Both must be non-empty.
    pub fn parse_identity(common_name: &str) -> Result<Self, IdentityError> {
        let invalid = || IdentityError::InvalidIdentity {
            common_name: common_name.to_string(),
        };

        let mut segments = common_name.splitn(3, '.');
        let namespace = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let id = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        Ok(Self::new(namespace, id))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.id)
    }
}

impl FromStr for Urn {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_identity(s)
    }
}
