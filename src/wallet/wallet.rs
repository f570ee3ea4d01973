//! Signer wallets
//!
//! A wallet holds the key pair behind a signer address. The CLI only lets
//! a command act as an address whose wallet is stored locally.

use crate::crypto::{Address, KeyError, KeyPair};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wallet-related errors
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("No local key for address: {0}")]
    NotFound(Address),
    #[error("Wallet file {path} does not match address {expected}")]
    AddressMismatch { path: PathBuf, expected: Address },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// Serializable wallet data for persistence
#[derive(Debug, Serialize, Deserialize)]
struct WalletData {
    private_key_hex: String,
    address: Address,
    label: Option<String>,
}

/// Key material for one signer identity
pub struct Wallet {
    key_pair: KeyPair,
    /// Optional label for the wallet
    pub label: Option<String>,
}

impl Wallet {
    /// Create a new wallet with a fresh key pair
    pub fn new() -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: None,
        }
    }

    /// Create a wallet with a label
    pub fn with_label(label: &str) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            label: Some(label.to_string()),
        }
    }

    /// Import a wallet from a private key
    pub fn from_private_key(private_key_hex: &str) -> Result<Self, WalletError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        Ok(Self {
            key_pair,
            label: None,
        })
    }

    /// The signer address
    pub fn address(&self) -> Address {
        self.key_pair.address()
    }

    /// EVM account address of the same key, used by the deployment manifest
    pub fn evm_address(&self) -> alloy_primitives::Address {
        self.key_pair.evm_address()
    }

    /// Public key (hex)
    pub fn public_key(&self) -> String {
        self.key_pair.public_key_hex()
    }

    /// Save wallet to file
    pub fn save(&self, path: &Path) -> Result<(), WalletError> {
        let data = WalletData {
            private_key_hex: self.key_pair.private_key_hex(),
            address: self.address(),
            label: self.label.clone(),
        };

        let json = serde_json::to_string_pretty(&data)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load wallet from file
    ///
    /// The stored address must match the one derived from the key.
    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let json = fs::read_to_string(path)?;
        let data: WalletData = serde_json::from_str(&json)?;

        let mut wallet = Self::from_private_key(&data.private_key_hex)?;
        if wallet.address() != data.address {
            return Err(WalletError::AddressMismatch {
                path: path.to_path_buf(),
                expected: data.address,
            });
        }
        wallet.label = data.label;
        Ok(wallet)
    }

    /// Export wallet info (without private key)
    pub fn export_public_info(&self) -> WalletInfo {
        WalletInfo {
            address: self.address(),
            evm_address: self.evm_address(),
            public_key: self.public_key(),
            label: self.label.clone(),
        }
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

/// Public wallet information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: Address,
    pub evm_address: alloy_primitives::Address,
    pub public_key: String,
    pub label: Option<String>,
}

/// Directory of signer wallets, one JSON file per address
pub struct WalletManager {
    wallets_dir: PathBuf,
}

impl WalletManager {
    /// Create a new wallet manager
    pub fn new(wallets_dir: &Path) -> Result<Self, WalletError> {
        fs::create_dir_all(wallets_dir)?;
        Ok(Self {
            wallets_dir: wallets_dir.to_path_buf(),
        })
    }

    fn wallet_path(&self, address: &Address) -> PathBuf {
        self.wallets_dir.join(format!("{}.json", address))
    }

    /// Create and save a new wallet
    pub fn create_wallet(&self, label: Option<&str>) -> Result<Wallet, WalletError> {
        let wallet = match label {
            Some(l) => Wallet::with_label(l),
            None => Wallet::new(),
        };

        wallet.save(&self.wallet_path(&wallet.address()))?;
        Ok(wallet)
    }

    /// Import a private key and save it
    pub fn import_wallet(
        &self,
        private_key_hex: &str,
        label: Option<&str>,
    ) -> Result<Wallet, WalletError> {
        let mut wallet = Wallet::from_private_key(private_key_hex)?;
        wallet.label = label.map(str::to_string);

        wallet.save(&self.wallet_path(&wallet.address()))?;
        Ok(wallet)
    }

    /// List all wallet addresses, sorted
    pub fn list_wallets(&self) -> Result<Vec<Address>, WalletError> {
        let mut addresses = Vec::new();

        for entry in fs::read_dir(&self.wallets_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match Wallet::load(&path) {
                    Ok(wallet) => addresses.push(wallet.address()),
                    Err(e) => log::warn!("Skipping unreadable wallet {:?}: {}", path, e),
                }
            }
        }

        addresses.sort();
        Ok(addresses)
    }

    /// Load a specific wallet by address
    pub fn load_wallet(&self, address: &Address) -> Result<Wallet, WalletError> {
        let path = self.wallet_path(address);
        if !path.exists() {
            return Err(WalletError::NotFound(address.clone()));
        }
        Wallet::load(&path)
    }

    /// Delete a wallet
    pub fn delete_wallet(&self, address: &Address) -> Result<(), WalletError> {
        let path = self.wallet_path(address);
        if !path.exists() {
            return Err(WalletError::NotFound(address.clone()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_creation() {
        let wallet = Wallet::new();
        assert!(!wallet.address().is_empty());
        assert!(!wallet.public_key().is_empty());
    }

    #[test]
    fn test_wallet_import() {
        let wallet1 = Wallet::new();
        let private_key = wallet1.key_pair.private_key_hex();

        let wallet2 = Wallet::from_private_key(&private_key).unwrap();
        assert_eq!(wallet1.address(), wallet2.address());
    }

    #[test]
    fn test_wallet_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("test_wallet.json");

        let wallet1 = Wallet::with_label("Test Wallet");
        wallet1.save(&path).unwrap();

        let wallet2 = Wallet::load(&path).unwrap();
        assert_eq!(wallet1.address(), wallet2.address());
        assert_eq!(wallet1.label, wallet2.label);
    }

    #[test]
    fn test_public_info_omits_private_key() {
        let wallet = Wallet::with_label("ops");
        let info = wallet.export_public_info();
        assert_eq!(info.address, wallet.address());
        assert_eq!(info.evm_address, wallet.evm_address());
        assert_eq!(info.label.as_deref(), Some("ops"));

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains(&wallet.key_pair.private_key_hex()));
    }

    #[test]
    fn test_load_rejects_mismatched_address() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("forged.json");

        let data = WalletData {
            private_key_hex: Wallet::new().key_pair.private_key_hex(),
            address: Address::from("1SomebodyElse"),
            label: None,
        };
        fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();

        assert!(matches!(
            Wallet::load(&path),
            Err(WalletError::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_manager_create_list_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WalletManager::new(temp_dir.path()).unwrap();

        let a = manager.create_wallet(Some("alice")).unwrap();
        let b = manager.create_wallet(None).unwrap();

        let listed = manager.list_wallets().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a.address()));
        assert!(listed.contains(&b.address()));

        let loaded = manager.load_wallet(&a.address()).unwrap();
        assert_eq!(loaded.label.as_deref(), Some("alice"));
    }

    #[test]
    fn test_manager_import_and_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WalletManager::new(temp_dir.path()).unwrap();

        let source = Wallet::new();
        let imported = manager
            .import_wallet(&source.key_pair.private_key_hex(), Some("ops"))
            .unwrap();
        assert_eq!(imported.address(), source.address());

        manager.delete_wallet(&imported.address()).unwrap();
        assert!(matches!(
            manager.load_wallet(&imported.address()),
            Err(WalletError::NotFound(_))
        ));
    }
}
