//! Registry configuration
//!
//! The signer set, approval threshold and base delay are fixed when a
//! registry is constructed. They are validated here once so the registry
//! itself can rely on them.

use crate::crypto::Address;
use crate::registry::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default delay between submission and earliest acknowledgement (one hour)
pub const DEFAULT_BASE_DELAY: u64 = 3600;

/// Construction parameters for a message registry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Authorized signers, in registration order
    signers: Vec<Address>,
    /// Distinct approvals needed before acknowledgement (M in M-of-N)
    required_approvals: u8,
    /// Base delay in seconds; jitter of up to one more delay is added per message
    base_delay: u64,
}

impl RegistryConfig {
    /// Create a new registry configuration
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` if the signer list is empty, contains
    /// empty or duplicate addresses, or the threshold is not within
    /// `1..=signers.len()`.
    ///
    /// A zero `base_delay` is accepted here; submitting a message under such
    /// a configuration fails instead.
    pub fn new(
        signers: Vec<Address>,
        required_approvals: u8,
        base_delay: u64,
    ) -> Result<Self, RegistryError> {
        if signers.is_empty() {
            return Err(RegistryError::InvalidConfiguration(
                "at least one signer is required".to_string(),
            ));
        }

        if signers.iter().any(Address::is_empty) {
            return Err(RegistryError::InvalidConfiguration(
                "signer address must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(signers.len());
        for signer in &signers {
            if !seen.insert(signer.as_str()) {
                return Err(RegistryError::InvalidConfiguration(format!(
                    "duplicate signer {}",
                    signer
                )));
            }
        }
        drop(seen);

        if required_approvals == 0 {
            return Err(RegistryError::InvalidConfiguration(
                "required approvals must be at least 1".to_string(),
            ));
        }

        if required_approvals as usize > signers.len() {
            return Err(RegistryError::InvalidConfiguration(format!(
                "required approvals {} exceeds signer count {}",
                required_approvals,
                signers.len()
            )));
        }

        Ok(Self {
            signers,
            required_approvals,
            base_delay,
        })
    }

    /// Authorized signers
    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    /// Approval threshold
    pub fn required_approvals(&self) -> u8 {
        self.required_approvals
    }

    /// Base delay in seconds
    pub fn base_delay(&self) -> u64 {
        self.base_delay
    }

    /// Linear scan over the signer list
    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.iter().any(|s| s == address)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required_approvals, self.signers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(names: &[&str]) -> Vec<Address> {
        names.iter().map(|n| Address::from(*n)).collect()
    }

    #[test]
    fn test_config_creation() {
        let config = RegistryConfig::new(addrs(&["a", "b", "c"]), 2, 3600).unwrap();
        assert_eq!(config.required_approvals(), 2);
        assert_eq!(config.signers().len(), 3);
        assert_eq!(config.base_delay(), 3600);
        assert_eq!(config.description(), "2-of-3");
    }

    #[test]
    fn test_config_validation() {
        // No signers
        assert!(matches!(
            RegistryConfig::new(vec![], 1, 60),
            Err(RegistryError::InvalidConfiguration(_))
        ));

        // Zero threshold
        assert!(RegistryConfig::new(addrs(&["a", "b"]), 0, 60).is_err());

        // Threshold > signers
        assert!(RegistryConfig::new(addrs(&["a", "b"]), 3, 60).is_err());

        // Duplicate signers
        assert!(RegistryConfig::new(addrs(&["a", "a"]), 1, 60).is_err());

        // Blank signer
        assert!(RegistryConfig::new(addrs(&["a", "  "]), 1, 60).is_err());
    }

    #[test]
    fn test_single_signer_allowed() {
        let config = RegistryConfig::new(addrs(&["a"]), 1, 60).unwrap();
        assert_eq!(config.description(), "1-of-1");
    }

    #[test]
    fn test_zero_delay_accepted_at_construction() {
        let config = RegistryConfig::new(addrs(&["a"]), 1, 0).unwrap();
        assert_eq!(config.base_delay(), 0);
    }

    #[test]
    fn test_is_signer() {
        let config = RegistryConfig::new(addrs(&["a", "b"]), 1, 60).unwrap();
        assert!(config.is_signer(&Address::from("a")));
        assert!(config.is_signer(&Address::from("b")));
        assert!(!config.is_signer(&Address::from("c")));
    }
}
