//! Registry failure taxonomy

use crate::crypto::Address;
use thiserror::Error;

/// Errors returned by registry operations.
///
/// Every error is raised before any state is touched, so a failed call
/// leaves the registry exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Not a signer: {0}")]
    Unauthorized(Address),
    #[error("Message does not exist: {0}")]
    NotFound(u64),
    #[error("Message already acknowledged: {0}")]
    AlreadyFinalized(u64),
    #[error("Message {nonce} already approved by {signer}")]
    DuplicateApproval { nonce: u64, signer: Address },
    #[error("Not enough approvals for message {nonce}: have {have}, need {need}")]
    QuorumNotMet { nonce: u64, have: usize, need: u8 },
    #[error("Message {nonce} is still in delay period: releases at {release_time}, now {now}")]
    DelayNotElapsed {
        nonce: u64,
        release_time: u64,
        now: u64,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("No messages sent to Zeek yet!")]
    EmptyRegistry,
    /// Stored state that no sequence of operations could have produced
    #[error("Inconsistent registry state: {0}")]
    InconsistentState(String),
}
