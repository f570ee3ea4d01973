//! Call context
//!
//! Every registry operation runs against a `CallContext`: who is calling,
//! the current time, and an unpredictable value used to jitter release
//! times. Production callers build one from the wall clock and OS entropy;
//! tests pin every field.

use crate::crypto::{reduce_mod, sha256, Address};
use chrono::Utc;
use rand::RngCore;

/// Size of the randomness input in bytes
pub const RANDOMNESS_LEN: usize = 32;

/// Execution context for a registry call
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Calling identity
    pub caller: Address,
    /// Current unix timestamp in seconds
    pub timestamp: u64,
    /// Unpredictable value mixed into release-time jitter
    pub randomness: [u8; RANDOMNESS_LEN],
}

impl CallContext {
    /// Context at the current wall-clock time with fresh OS entropy
    pub fn now(caller: Address) -> Self {
        let mut randomness = [0u8; RANDOMNESS_LEN];
        rand::thread_rng().fill_bytes(&mut randomness);

        Self {
            caller,
            timestamp: Utc::now().timestamp().max(0) as u64,
            randomness,
        }
    }

    /// Context at a fixed timestamp with zeroed randomness
    pub fn at(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            timestamp,
            randomness: [0u8; RANDOMNESS_LEN],
        }
    }

    /// Replace the randomness input
    pub fn with_randomness(mut self, randomness: [u8; RANDOMNESS_LEN]) -> Self {
        self.randomness = randomness;
        self
    }

    /// Jitter added on top of `base_delay`: `SHA-256(timestamp || randomness) mod base_delay`.
    ///
    /// Returns `None` when `base_delay` is zero.
    pub fn jitter(&self, base_delay: u64) -> Option<u64> {
        let mut preimage = Vec::with_capacity(8 + RANDOMNESS_LEN);
        preimage.extend_from_slice(&self.timestamp.to_be_bytes());
        preimage.extend_from_slice(&self.randomness);

        reduce_mod(&sha256(&preimage), base_delay)
    }

    /// Release time for a message submitted in this context.
    ///
    /// `None` when `base_delay` is zero or the result would overflow.
    pub fn release_time(&self, base_delay: u64) -> Option<u64> {
        let jitter = self.jitter(base_delay)?;
        log::debug!(
            "Release jitter {}s on base delay {}s at t={}",
            jitter,
            base_delay,
            self.timestamp
        );
        self.timestamp.checked_add(base_delay)?.checked_add(jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_deterministic() {
        let ctx = CallContext::at(Address::from("a"), 1_700_000_000).with_randomness([7u8; 32]);
        assert_eq!(ctx.jitter(3600), ctx.jitter(3600));
    }

    #[test]
    fn test_jitter_bounded_by_delay() {
        for seed in 0u8..=50 {
            let ctx = CallContext::at(Address::from("a"), 1_000 + seed as u64)
                .with_randomness([seed; 32]);
            for delay in [1u64, 2, 60, 3600, 86_400] {
                assert!(ctx.jitter(delay).unwrap() < delay);
            }
        }
    }

    #[test]
    fn test_jitter_depends_on_randomness() {
        let base = CallContext::at(Address::from("a"), 1_700_000_000);
        let distinct: std::collections::HashSet<u64> = (0u8..16)
            .map(|b| base.clone().with_randomness([b; 32]).jitter(1_000_000).unwrap())
            .collect();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn test_zero_delay_has_no_jitter() {
        let ctx = CallContext::at(Address::from("a"), 10);
        assert_eq!(ctx.jitter(0), None);
        assert_eq!(ctx.release_time(0), None);
    }

    #[test]
    fn test_release_time_window() {
        let ctx = CallContext::at(Address::from("a"), 5_000).with_randomness([3u8; 32]);
        let release = ctx.release_time(3600).unwrap();
        assert!(release >= 5_000 + 3600);
        assert!(release < 5_000 + 7200);
    }

    #[test]
    fn test_release_time_overflow() {
        let ctx = CallContext::at(Address::from("a"), u64::MAX - 10);
        assert_eq!(ctx.release_time(3600), None);
    }

    #[test]
    fn test_now_uses_wall_clock() {
        let before = Utc::now().timestamp() as u64;
        let ctx = CallContext::now(Address::from("a"));
        assert!(ctx.timestamp >= before);
        assert_eq!(ctx.caller, Address::from("a"));
    }
}
