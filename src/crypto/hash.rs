//! Hashing utilities
//!
//! SHA-256 helpers used for address checksums and for deriving the
//! release-time jitter of submitted messages.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Reduce a big-endian unsigned integer of arbitrary width modulo `modulus`.
///
/// A 32-byte digest is treated as a `uint256`, so this matches
/// `uint256(digest) % modulus`. Returns `None` for a zero modulus.
pub fn reduce_mod(digest: &[u8], modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }

    let modulus = modulus as u128;
    let remainder = digest
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus);

    Some(remainder as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_double_sha256() {
        let data = b"hello world";
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn test_reduce_mod_small_values() {
        assert_eq!(reduce_mod(&[0x01, 0x00], 7), Some(256 % 7));
        assert_eq!(reduce_mod(&[0xff], 16), Some(15));
        assert_eq!(reduce_mod(&[], 5), Some(0));
    }

    #[test]
    fn test_reduce_mod_matches_u64_arithmetic() {
        let value: u64 = 0xdead_beef_cafe_babe;
        for modulus in [1u64, 2, 3, 3600, 86_400, u64::MAX] {
            assert_eq!(
                reduce_mod(&value.to_be_bytes(), modulus),
                Some(value % modulus)
            );
        }
    }

    #[test]
    fn test_reduce_mod_full_digest_in_range() {
        let digest = sha256(b"jitter");
        for modulus in [1u64, 60, 3600, u64::MAX] {
            let r = reduce_mod(&digest, modulus).unwrap();
            assert!(r < modulus);
        }
    }

    #[test]
    fn test_reduce_mod_zero_modulus() {
        assert_eq!(reduce_mod(&[1, 2, 3], 0), None);
    }
}
