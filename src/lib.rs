//! Zeek Messages: a quorum-approved, time-delayed message registry
//!
//! This crate provides:
//! - An append-only message log gated by an M-of-N signer quorum
//! - Randomized release times derived from caller-supplied entropy
//! - A terminal acknowledgement state enforced by the record type
//! - An event log for observers
//! - secp256k1 signer keys and a local keystore
//! - JSON persistence with atomic writes and backups
//! - A deployment manifest for external deployers
//!
//! # Example
//!
//! ```rust
//! use zeek_messages::crypto::Address;
//! use zeek_messages::registry::{CallContext, MessageRegistry, RegistryConfig, RegistryError};
//!
//! let alice = Address::from("alice");
//! let config = RegistryConfig::new(vec![alice.clone()], 1, 3600).unwrap();
//! let mut registry = MessageRegistry::new(config, &CallContext::at(alice.clone(), 0));
//!
//! assert_eq!(registry.last_message_content(), Err(RegistryError::EmptyRegistry));
//!
//! registry.send_message("gm", &CallContext::at(alice.clone(), 10)).unwrap();
//! assert_eq!(registry.total_message_count(), 1);
//! assert_eq!(registry.last_message_content(), Ok("gm"));
//! ```

pub mod cli;
pub mod crypto;
pub mod deploy;
pub mod registry;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use crypto::{Address, KeyPair};
pub use deploy::{DeploymentManifest, NetworkConfig};
pub use registry::{
    CallContext, MessageRecord, MessageRegistry, MessageStatus, RegistryConfig, RegistryError,
    RegistryEvent,
};
pub use storage::{Storage, StorageConfig};
pub use wallet::{Wallet, WalletManager};
