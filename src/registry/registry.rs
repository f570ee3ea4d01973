//! Message approval registry
//!
//! Holds the append-only message log and routes every mutation through
//! `send_message`, `approve_message` and `acknowledge_message`.

use crate::crypto::Address;
use crate::registry::config::RegistryConfig;
use crate::registry::context::CallContext;
use crate::registry::error::RegistryError;
use crate::registry::event::RegistryEvent;
use crate::registry::message::{MessageRecord, MessageState, MessageStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Content of the informational event emitted at construction
pub const WELCOME_MESSAGE: &str = "Zeek welcomes you to ZKsync!";

/// A quorum-gated, time-delayed message registry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageRegistry {
    /// Identity that constructed the registry
    admin: Address,
    /// Signers, threshold and delay
    config: RegistryConfig,
    /// Nonce of the most recent message (0 when empty)
    message_nonce: u64,
    /// Records in nonce order; record `n` lives at index `n - 1`
    messages: Vec<MessageRecord>,
    /// Every event emitted so far, oldest first
    events: Vec<RegistryEvent>,
}

impl MessageRegistry {
    /// Construct a registry. The caller becomes the administrator.
    pub fn new(config: RegistryConfig, ctx: &CallContext) -> Self {
        let welcome = RegistryEvent::MessageReceived {
            nonce: 0,
            content: WELCOME_MESSAGE.to_string(),
            timestamp: ctx.timestamp.saturating_add(config.base_delay()),
        };

        log::info!(
            "Registry constructed by {} ({}, base delay {}s)",
            ctx.caller,
            config.description(),
            config.base_delay()
        );

        Self {
            admin: ctx.caller.clone(),
            config,
            message_nonce: 0,
            messages: Vec::new(),
            events: vec![welcome],
        }
    }

    // =========================================================================
    // Read operations
    // =========================================================================

    /// Administrator address
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Authorized signers
    pub fn signers(&self) -> &[Address] {
        self.config.signers()
    }

    /// Approval threshold
    pub fn required_approvals(&self) -> u8 {
        self.config.required_approvals()
    }

    /// Base delay in seconds
    pub fn base_delay(&self) -> u64 {
        self.config.base_delay()
    }

    /// Whether `address` is in the signer list
    pub fn is_authorized_signer(&self, address: &Address) -> bool {
        self.config.is_signer(address)
    }

    /// Total number of messages submitted
    pub fn total_message_count(&self) -> u64 {
        self.message_nonce
    }

    /// Content of the most recently submitted message
    pub fn last_message_content(&self) -> Result<&str, RegistryError> {
        if self.message_nonce == 0 {
            return Err(RegistryError::EmptyRegistry);
        }
        self.message(self.message_nonce)
            .map(|m| m.content.as_str())
            .ok_or(RegistryError::NotFound(self.message_nonce))
    }

    /// Look up a message by nonce
    pub fn message(&self, nonce: u64) -> Option<&MessageRecord> {
        let index = usize::try_from(nonce.checked_sub(1)?).ok()?;
        self.messages.get(index)
    }

    /// Whether `signer` approved message `nonce`
    pub fn has_approved(&self, nonce: u64, signer: &Address) -> bool {
        self.message(nonce)
            .map(|m| m.has_approved(signer))
            .unwrap_or(false)
    }

    /// All messages in nonce order
    pub fn messages(&self) -> impl Iterator<Item = &MessageRecord> {
        self.messages.iter()
    }

    /// Every emitted event, oldest first
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Events that refer to message `nonce`
    pub fn events_for(&self, nonce: u64) -> Vec<&RegistryEvent> {
        self.events.iter().filter(|e| e.nonce() == nonce).collect()
    }

    /// Derived status of message `nonce` at time `now`
    pub fn status(&self, nonce: u64, now: u64) -> Option<MessageStatus> {
        self.message(nonce)
            .map(|m| m.status(self.config.required_approvals(), now))
    }

    // =========================================================================
    // Mutating operations
    // =========================================================================

    /// Submit a new message. Returns its nonce.
    pub fn send_message(
        &mut self,
        content: impl Into<String>,
        ctx: &CallContext,
    ) -> Result<u64, RegistryError> {
        self.ensure_signer(&ctx.caller)?;

        let base_delay = self.config.base_delay();
        if base_delay == 0 {
            return Err(RegistryError::InvalidConfiguration(
                "base delay must be greater than zero to submit messages".to_string(),
            ));
        }

        let release_time = ctx.release_time(base_delay).ok_or_else(|| {
            RegistryError::InvalidConfiguration(format!(
                "release time overflows at t={} with base delay {}",
                ctx.timestamp, base_delay
            ))
        })?;

        let nonce = self.message_nonce.checked_add(1).ok_or_else(|| {
            RegistryError::InvalidConfiguration("message nonce exhausted".to_string())
        })?;

        let content = content.into();
        self.message_nonce = nonce;
        self.messages.push(MessageRecord::new(
            nonce,
            content.clone(),
            release_time,
            ctx.caller.clone(),
            ctx.timestamp,
        ));
        self.events.push(RegistryEvent::MessageReceived {
            nonce,
            content,
            timestamp: release_time,
        });

        log::info!(
            "Message {} submitted by {}, releases at {}",
            nonce,
            ctx.caller,
            release_time
        );
        Ok(nonce)
    }

    /// Approve message `nonce` as the caller. Returns the new approval count.
    pub fn approve_message(&mut self, nonce: u64, ctx: &CallContext) -> Result<usize, RegistryError> {
        self.ensure_signer(&ctx.caller)?;

        let record = self.message(nonce).ok_or(RegistryError::NotFound(nonce))?;
        if record.acknowledged() {
            return Err(RegistryError::AlreadyFinalized(nonce));
        }
        if record.has_approved(&ctx.caller) {
            return Err(RegistryError::DuplicateApproval {
                nonce,
                signer: ctx.caller.clone(),
            });
        }

        let record = self.message_mut(nonce)?;
        record.record_approval(ctx.caller.clone());
        let count = record.approval_count();

        self.events.push(RegistryEvent::MessageApproved {
            nonce,
            approver: ctx.caller.clone(),
        });

        log::debug!(
            "Message {} approved by {} ({}/{})",
            nonce,
            ctx.caller,
            count,
            self.config.required_approvals()
        );
        Ok(count)
    }

    /// Acknowledge message `nonce`. Irreversible once it succeeds.
    pub fn acknowledge_message(&mut self, nonce: u64, ctx: &CallContext) -> Result<(), RegistryError> {
        self.ensure_signer(&ctx.caller)?;

        let need = self.config.required_approvals();
        let record = self.message(nonce).ok_or(RegistryError::NotFound(nonce))?;

        let have = record.approval_count();
        if have < need as usize {
            return Err(RegistryError::QuorumNotMet { nonce, have, need });
        }
        if ctx.timestamp < record.release_time {
            return Err(RegistryError::DelayNotElapsed {
                nonce,
                release_time: record.release_time,
                now: ctx.timestamp,
            });
        }
        if record.acknowledged() {
            return Err(RegistryError::AlreadyFinalized(nonce));
        }

        self.message_mut(nonce)?
            .finalize(ctx.caller.clone(), ctx.timestamp);
        self.events.push(RegistryEvent::MessageAcknowledged {
            nonce,
            executor: ctx.caller.clone(),
        });

        log::info!("Message {} acknowledged by {}", nonce, ctx.caller);
        Ok(())
    }

    /// Check internal consistency, e.g. after loading from disk
    ///
    /// Rejects any state that the operations above could not have produced:
    /// records out of sequence, release times outside the jitter window,
    /// acknowledgements without quorum or before release, identities that
    /// are not signers, and an event log that disagrees with the records.
    pub fn validate(&self) -> Result<(), RegistryError> {
        RegistryConfig::new(
            self.config.signers().to_vec(),
            self.config.required_approvals(),
            self.config.base_delay(),
        )?;

        if self.messages.len() as u64 != self.message_nonce {
            return Err(inconsistent(format!(
                "nonce counter {} does not match {} stored messages",
                self.message_nonce,
                self.messages.len()
            )));
        }

        for (index, record) in self.messages.iter().enumerate() {
            if record.nonce != index as u64 + 1 {
                return Err(inconsistent(format!(
                    "message at position {} has nonce {}",
                    index + 1,
                    record.nonce
                )));
            }
            self.validate_record(record)?;
        }

        self.validate_events()
    }

    fn validate_record(&self, record: &MessageRecord) -> Result<(), RegistryError> {
        let nonce = record.nonce;

        if !self.config.is_signer(&record.submitted_by) {
            return Err(inconsistent(format!(
                "message {} submitted by non-signer {}",
                nonce, record.submitted_by
            )));
        }

        // release = submitted + delay + jitter, jitter < delay
        let delay = u128::from(self.config.base_delay());
        let offset = u128::from(record.release_time).checked_sub(u128::from(record.submitted_at));
        if !matches!(offset, Some(o) if delay > 0 && o >= delay && o < 2 * delay) {
            return Err(inconsistent(format!(
                "message {} release time {} is outside the window for submission at {}",
                nonce, record.release_time, record.submitted_at
            )));
        }

        if let Some(stranger) = record.approvals().iter().find(|a| !self.config.is_signer(a)) {
            return Err(inconsistent(format!(
                "message {} approved by non-signer {}",
                nonce, stranger
            )));
        }

        if let MessageState::Acknowledged {
            approvals,
            executor,
            acknowledged_at,
        } = record.state()
        {
            let need = self.config.required_approvals();
            if approvals.len() < need as usize {
                return Err(inconsistent(format!(
                    "message {} acknowledged with {} of {} approvals",
                    nonce,
                    approvals.len(),
                    need
                )));
            }
            if *acknowledged_at < record.release_time {
                return Err(inconsistent(format!(
                    "message {} acknowledged at {} before release at {}",
                    nonce, acknowledged_at, record.release_time
                )));
            }
            if !self.config.is_signer(executor) {
                return Err(inconsistent(format!(
                    "message {} acknowledged by non-signer {}",
                    nonce, executor
                )));
            }
        }

        Ok(())
    }

    /// Replay the event log and compare the outcome with the records
    fn validate_events(&self) -> Result<(), RegistryError> {
        match self.events.first() {
            Some(RegistryEvent::MessageReceived { nonce: 0, content, .. })
                if content == WELCOME_MESSAGE => {}
            _ => {
                return Err(inconsistent(
                    "event log does not start with the welcome event",
                ))
            }
        }

        let mut received = 0u64;
        let mut approvals: Vec<BTreeSet<&Address>> = vec![BTreeSet::new(); self.messages.len()];
        let mut executors: Vec<Option<&Address>> = vec![None; self.messages.len()];

        for event in &self.events[1..] {
            match event {
                RegistryEvent::MessageReceived {
                    nonce,
                    content,
                    timestamp,
                } => {
                    let record = self
                        .message(*nonce)
                        .filter(|_| *nonce == received + 1)
                        .ok_or_else(|| {
                            inconsistent(format!("unexpected {} for message {}", event.name(), nonce))
                        })?;
                    if *content != record.content || *timestamp != record.release_time {
                        return Err(inconsistent(format!(
                            "{} for message {} does not match the record",
                            event.name(),
                            nonce
                        )));
                    }
                    received = *nonce;
                }
                RegistryEvent::MessageApproved { nonce, approver } => {
                    let index = replayed_index(event, received)?;
                    if executors[index].is_some() || !approvals[index].insert(approver) {
                        return Err(inconsistent(format!(
                            "unexpected {} for message {} by {}",
                            event.name(),
                            nonce,
                            approver
                        )));
                    }
                }
                RegistryEvent::MessageAcknowledged { nonce, executor } => {
                    let index = replayed_index(event, received)?;
                    if executors[index].replace(executor).is_some() {
                        return Err(inconsistent(format!(
                            "message {} acknowledged twice",
                            nonce
                        )));
                    }
                }
            }
        }

        if received != self.message_nonce {
            return Err(inconsistent(format!(
                "event log has no MessageReceived for message {}",
                received + 1
            )));
        }

        for (record, (approved, executor)) in self.messages.iter().zip(approvals.iter().zip(&executors)) {
            if !approved.iter().copied().eq(record.approvals().iter()) {
                return Err(inconsistent(format!(
                    "approval events for message {} do not match its approvals",
                    record.nonce
                )));
            }
            if *executor != record.executor() {
                return Err(inconsistent(format!(
                    "acknowledgement events for message {} do not match its state",
                    record.nonce
                )));
            }
        }

        Ok(())
    }

    fn ensure_signer(&self, caller: &Address) -> Result<(), RegistryError> {
        if self.config.is_signer(caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized(caller.clone()))
        }
    }

    fn message_mut(&mut self, nonce: u64) -> Result<&mut MessageRecord, RegistryError> {
        let index = nonce
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .ok_or(RegistryError::NotFound(nonce))?;
        self.messages
            .get_mut(index)
            .ok_or(RegistryError::NotFound(nonce))
    }
}

fn inconsistent(reason: impl Into<String>) -> RegistryError {
    RegistryError::InconsistentState(reason.into())
}

/// Record index for an approval or acknowledgement event; the message must
/// already have been received earlier in the log
fn replayed_index(event: &RegistryEvent, received: u64) -> Result<usize, RegistryError> {
    let nonce = event.nonce();
    if nonce == 0 || nonce > received {
        return Err(inconsistent(format!(
            "{} for message {} precedes its submission",
            event.name(),
            nonce
        )));
    }
    usize::try_from(nonce - 1)
        .map_err(|_| inconsistent(format!("nonce {} out of range", nonce)))
}
