//! Wallet module for signer key management

pub mod wallet;

pub use wallet::{Wallet, WalletError, WalletInfo, WalletManager};
