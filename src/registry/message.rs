//! Message records
//!
//! A record moves from `Pending` (collecting approvals) to `Acknowledged`.
//! The acknowledged state has no way back and no mutating methods, so a
//! finalized record cannot be changed.

use crate::crypto::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of a message record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MessageState {
    /// Waiting for approvals and/or the release time
    Pending { approvals: BTreeSet<Address> },
    /// Finalized; terminal
    Acknowledged {
        approvals: BTreeSet<Address>,
        executor: Address,
        acknowledged_at: u64,
    },
}

/// Derived view of where a message stands at a given time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Quorum not reached yet
    Pending,
    /// Quorum reached, release time still ahead
    AwaitingRelease,
    /// Quorum reached and release time passed
    Acknowledgeable,
    /// Finalized
    Acknowledged,
}

/// A submitted message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message nonce (starts at 1)
    pub nonce: u64,
    /// Text payload
    pub content: String,
    /// Earliest unix timestamp at which the message may be acknowledged
    pub release_time: u64,
    /// Signer that submitted the message
    pub submitted_by: Address,
    /// Submission timestamp
    pub submitted_at: u64,
    /// Lifecycle state
    state: MessageState,
}

impl MessageRecord {
    pub(crate) fn new(
        nonce: u64,
        content: String,
        release_time: u64,
        submitted_by: Address,
        submitted_at: u64,
    ) -> Self {
        Self {
            nonce,
            content,
            release_time,
            submitted_by,
            submitted_at,
            state: MessageState::Pending {
                approvals: BTreeSet::new(),
            },
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> &MessageState {
        &self.state
    }

    /// Signers that approved this message
    pub fn approvals(&self) -> &BTreeSet<Address> {
        match &self.state {
            MessageState::Pending { approvals } | MessageState::Acknowledged { approvals, .. } => {
                approvals
            }
        }
    }

    /// Number of distinct approvals
    pub fn approval_count(&self) -> usize {
        self.approvals().len()
    }

    /// Whether `signer` has approved this message
    pub fn has_approved(&self, signer: &Address) -> bool {
        self.approvals().contains(signer)
    }

    /// Whether the message reached its terminal state
    pub fn acknowledged(&self) -> bool {
        matches!(self.state, MessageState::Acknowledged { .. })
    }

    /// Who acknowledged the message, if anyone
    pub fn executor(&self) -> Option<&Address> {
        match &self.state {
            MessageState::Acknowledged { executor, .. } => Some(executor),
            MessageState::Pending { .. } => None,
        }
    }

    /// When the message was acknowledged, if it was
    pub fn acknowledged_at(&self) -> Option<u64> {
        match &self.state {
            MessageState::Acknowledged {
                acknowledged_at, ..
            } => Some(*acknowledged_at),
            MessageState::Pending { .. } => None,
        }
    }

    /// Status at time `now` against the given threshold
    pub fn status(&self, required_approvals: u8, now: u64) -> MessageStatus {
        if self.acknowledged() {
            MessageStatus::Acknowledged
        } else if self.approval_count() < required_approvals as usize {
            MessageStatus::Pending
        } else if now < self.release_time {
            MessageStatus::AwaitingRelease
        } else {
            MessageStatus::Acknowledgeable
        }
    }

    /// Record an approval. Returns `false` if the record is final or the
    /// signer already approved; the registry checks both beforehand.
    pub(crate) fn record_approval(&mut self, signer: Address) -> bool {
        match &mut self.state {
            MessageState::Pending { approvals } => approvals.insert(signer),
            MessageState::Acknowledged { .. } => false,
        }
    }

    /// Move to the terminal state. Returns `false` if already there.
    pub(crate) fn finalize(&mut self, executor: Address, acknowledged_at: u64) -> bool {
        let approvals = match &mut self.state {
            MessageState::Pending { approvals } => std::mem::take(approvals),
            MessageState::Acknowledged { .. } => return false,
        };

        self.state = MessageState::Acknowledged {
            approvals,
            executor,
            acknowledged_at,
        };
        true
    }
}
