//! Signer key management
//!
//! Key pairs on the secp256k1 curve. The public key of a pair is what a
//! signer address is derived from.

use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::Digest;
use thiserror::Error;

use super::address::Address;
use super::hash::{double_sha256, sha256};

/// Version byte prepended to the address payload
const ADDRESS_VERSION: u8 = 0x00;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key (an optional `0x` prefix is accepted)
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let hex_key = hex_key.trim_start_matches("0x");
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// The signer address for this key pair
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// The 20-byte EVM account address for this key pair
    pub fn evm_address(&self) -> alloy_primitives::Address {
        public_key_to_evm_address(&self.public_key)
    }
}

/// Convert a public key to an EVM account address
///
/// Last 20 bytes of keccak256(uncompressed pubkey without the 0x04 prefix)
pub fn public_key_to_evm_address(public_key: &PublicKey) -> alloy_primitives::Address {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = alloy_primitives::keccak256(&uncompressed[1..]);
    alloy_primitives::Address::from_slice(&digest[12..])
}

/// Convert a public key to a signer address
///
/// Base58Check(version || RIPEMD160(SHA256(pubkey)))
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let sha256_hash = sha256(&public_key.serialize());

    let mut ripemd = Ripemd160::new();
    ripemd.update(&sha256_hash);
    let ripemd_hash = ripemd.finalize();

    let mut address_bytes = vec![ADDRESS_VERSION];
    address_bytes.extend_from_slice(&ripemd_hash);

    let checksum = double_sha256(&address_bytes);
    address_bytes.extend_from_slice(&checksum[..4]);

    Address::new(bs58::encode(address_bytes).into_string())
}
