//! Principal - identity of whoever invokes or is named by a ledger operation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("Principal cannot be empty")]
    Empty,

    #[error("Principal contains whitespace: {0:?}")]
    Whitespace(String),
}

/// An account identity resolved by the transport layer
/// (operator, passenger, oracle, gateway or the controller).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal, rejecting empty or whitespace-bearing identities.
    pub fn new(id: impl Into<String>) -> Result<Self, PrincipalError> {
        let id = id.into();
        if id.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(PrincipalError::Whitespace(id));
        }
        Ok(Self(id))
    }

    /// Create a Principal without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the id is non-empty and has no whitespace.
    /// Use only for compile-time constants such as configuration defaults.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_principal() {
        let p: Principal = "0xA1rL1ne".parse().unwrap();
        assert_eq!(p.as_str(), "0xA1rL1ne");
        assert_eq!(p.to_string(), "0xA1rL1ne");
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert_eq!(Principal::new(""), Err(PrincipalError::Empty));
        assert!(matches!(
            Principal::new("two words"),
            Err(PrincipalError::Whitespace(_))
        ));
    }

    #[test]
    fn test_serde_validates() {
        let parsed: Result<Principal, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: Principal = serde_json::from_str("\"ALICE\"").unwrap();
        assert_eq!(parsed.as_str(), "ALICE");
    }
}
