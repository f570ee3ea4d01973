//! Registry events
//!
//! Events let observers rebuild message history without re-reading the
//! full registry state.

use crate::crypto::Address;
use serde::{Deserialize, Serialize};

/// An event emitted by a registry operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RegistryEvent {
    /// A message was submitted (nonce 0 is the construction-time welcome)
    MessageReceived {
        nonce: u64,
        content: String,
        timestamp: u64,
    },
    /// A signer approved a message
    MessageApproved { nonce: u64, approver: Address },
    /// A message was acknowledged and is now final
    MessageAcknowledged { nonce: u64, executor: Address },
}

impl RegistryEvent {
    /// Nonce of the message the event refers to
    pub fn nonce(&self) -> u64 {
        match self {
            Self::MessageReceived { nonce, .. }
            | Self::MessageApproved { nonce, .. }
            | Self::MessageAcknowledged { nonce, .. } => *nonce,
        }
    }

    /// Event name as declared in the contract interface
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageReceived { .. } => "MessageReceived",
            Self::MessageApproved { .. } => "MessageApproved",
            Self::MessageAcknowledged { .. } => "MessageAcknowledged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = RegistryEvent::MessageApproved {
            nonce: 3,
            approver: Address::from("bob"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MessageApproved");
        assert_eq!(json["data"]["nonce"], 3);
        assert_eq!(json["data"]["approver"], "bob");
    }

    #[test]
    fn test_nonce_and_name() {
        let event = RegistryEvent::MessageAcknowledged {
            nonce: 9,
            executor: Address::from("carol"),
        };
        assert_eq!(event.nonce(), 9);
        assert_eq!(event.name(), "MessageAcknowledged");
    }
}
