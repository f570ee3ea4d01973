//! Message approval registry
//!
//! An append-only log of messages. Each message needs approvals from a
//! quorum of authorized signers, and can only be acknowledged once its
//! randomized release time has passed.
//!
//! # Example
//!
//! ```rust
//! use zeek_messages::crypto::Address;
//! use zeek_messages::registry::{CallContext, MessageRegistry, RegistryConfig};
//!
//! let alice = Address::from("alice");
//! let bob = Address::from("bob");
//! let config = RegistryConfig::new(vec![alice.clone(), bob.clone()], 2, 3600).unwrap();
//!
//! let mut registry = MessageRegistry::new(config, &CallContext::at(alice.clone(), 1_000));
//! let nonce = registry
//!     .send_message("hello", &CallContext::at(alice.clone(), 1_000))
//!     .unwrap();
//!
//! registry.approve_message(nonce, &CallContext::at(alice.clone(), 1_001)).unwrap();
//! registry.approve_message(nonce, &CallContext::at(bob.clone(), 1_002)).unwrap();
//!
//! let release = registry.message(nonce).unwrap().release_time;
//! registry
//!     .acknowledge_message(nonce, &CallContext::at(bob, release))
//!     .unwrap();
//! assert!(registry.message(nonce).unwrap().acknowledged());
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod message;
pub mod registry;

pub use config::{RegistryConfig, DEFAULT_BASE_DELAY};
pub use context::{CallContext, RANDOMNESS_LEN};
pub use error::RegistryError;
pub use event::RegistryEvent;
pub use message::{MessageRecord, MessageState, MessageStatus};
pub use registry::{MessageRegistry, WELCOME_MESSAGE};
