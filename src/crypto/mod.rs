//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing and wide modular reduction
//! - secp256k1 key pairs for signers, with Base58Check and EVM addresses
//! - The `Address` identity type

pub mod address;
pub mod hash;
pub mod keys;

pub use address::Address;
pub use hash::{double_sha256, reduce_mod, sha256, sha256_hex};
pub use keys::{public_key_to_address, public_key_to_evm_address, KeyError, KeyPair};
