//! Signer identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// An identity that can call into the registry.
///
/// Addresses derived from local keys are Base58Check strings, but any
/// non-empty identifier is accepted so externally issued identities
/// (e.g. `0x`-prefixed account addresses) can be registered as signers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap a raw identifier, trimming surrounding whitespace
    pub fn new(raw: impl Into<String>) -> Self {
        let raw: String = raw.into();
        Self(raw.trim().to_string())
    }

    /// Borrow the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shortened form for terminal output
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(Address::new("  alice \n"), Address::from("alice"));
    }

    #[test]
    fn test_short() {
        let addr = Address::from("0x5f8267F0AF048B478D4ad17423A4C8a098f87C40");
        assert_eq!(addr.short(), "0x5f8267F0AF");
        assert_eq!(Address::from("abc").short(), "abc");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let addr = Address::from("alice");
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"alice\"");
        let back: Address = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(back, addr);
    }
}
