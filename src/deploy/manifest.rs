//! Deployment manifest
//!
//! Everything an external deployer needs to submit the registry's
//! constructor transaction: the target network, the constructor arguments
//! (typed and ABI-encoded) and the contract's JSON ABI. Building, signing
//! and broadcasting the transaction happen outside this crate.

use crate::crypto::Address;
use crate::registry::RegistryConfig;
use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::{Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 20-byte account address used on the target chain
pub type EvmAddress = alloy_primitives::Address;

/// Contract name the manifest describes
pub const CONTRACT_NAME: &str = "ZeekMessages";

/// zkSync Era Sepolia testnet RPC endpoint
pub const DEFAULT_RPC_URL: &str = "https://sepolia.era.zksync.dev";

/// zkSync Era Sepolia chain id
pub const DEFAULT_CHAIN_ID: u64 = 300;

/// Gas limit for the constructor transaction
pub const DEFAULT_GAS_LIMIT: u64 = 3_000_000;

/// Human-readable ABI of the contract, public state getters included
const HUMAN_READABLE_ABI: &[&str] = &[
    "constructor(address[] _signers, uint8 _requiredApprovals, uint256 _delay)",
    // Entry points
    "function isSigner(address _address) view returns (bool)",
    "function sendMessage(string _message)",
    "function approveMessage(uint256 _nonce)",
    "function acknowledgeMessage(uint256 _nonce)",
    "function getTotalMessages() view returns (uint256)",
    "function getLastMessage() view returns (string)",
    // Getters for public state
    "function owner() view returns (address)",
    "function delay() view returns (uint256)",
    "function messageNonce() view returns (uint256)",
    "function messages(uint256) view returns (string content, uint256 timestamp, uint8 approvals, bool acknowledged)",
    "function approvals(uint256, address) view returns (bool)",
    "function signers(uint256) view returns (address)",
    "function requiredApprovals() view returns (uint8)",
    // Events
    "event MessageReceived(uint256 indexed nonce, string content, uint256 timestamp)",
    "event MessageApproved(uint256 indexed nonce, address indexed approver)",
    "event MessageAcknowledged(uint256 indexed nonce, address indexed executor)",
];

/// Manifest errors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Invalid network config: {0}")]
    InvalidNetwork(String),
    #[error("Signer {0} is not a 0x-prefixed EVM address and has no local key")]
    InvalidSigner(Address),
    #[error("Signer {0} appears more than once")]
    DuplicateSigner(EvmAddress),
    #[error("Invalid interface: {0}")]
    InvalidInterface(String),
    #[error("ABI encoding error: {0}")]
    EncodingError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Target network parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub gas_limit: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

impl NetworkConfig {
    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), ManifestError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ManifestError::InvalidNetwork(format!(
                "rpc url must be http(s): {}",
                self.rpc_url
            )));
        }
        if self.chain_id == 0 {
            return Err(ManifestError::InvalidNetwork(
                "chain id must be non-zero".to_string(),
            ));
        }
        if self.gas_limit == 0 {
            return Err(ManifestError::InvalidNetwork(
                "gas limit must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a signer written as a `0x`-prefixed 20-byte hex address
pub fn parse_evm_address(signer: &Address) -> Option<EvmAddress> {
    let s = signer.as_str();
    if !s.starts_with("0x") {
        return None;
    }
    s.parse().ok()
}

/// Constructor arguments, in declaration order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstructorArgs {
    pub signers: Vec<EvmAddress>,
    pub required_approvals: u8,
    pub delay: u64,
}

impl ConstructorArgs {
    /// Take the arguments from a config whose signers are all EVM addresses
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ManifestError> {
        Self::resolve(config, parse_evm_address)
    }

    /// Take the arguments from a config, mapping each signer through `lookup`
    ///
    /// # Errors
    /// `InvalidSigner` when `lookup` has no EVM address for a signer,
    /// `DuplicateSigner` when two signers map to the same account.
    pub fn resolve<F>(config: &RegistryConfig, mut lookup: F) -> Result<Self, ManifestError>
    where
        F: FnMut(&Address) -> Option<EvmAddress>,
    {
        let mut signers = Vec::with_capacity(config.signers().len());
        for signer in config.signers() {
            let account =
                lookup(signer).ok_or_else(|| ManifestError::InvalidSigner(signer.clone()))?;
            if signers.contains(&account) {
                return Err(ManifestError::DuplicateSigner(account));
            }
            signers.push(account);
        }

        Ok(Self {
            signers,
            required_approvals: config.required_approvals(),
            delay: config.base_delay(),
        })
    }

    /// ABI-encode the arguments against the interface's constructor
    pub fn encode(&self, abi: &JsonAbi) -> Result<Bytes, ManifestError> {
        let constructor = abi
            .constructor
            .as_ref()
            .ok_or_else(|| ManifestError::InvalidInterface("no constructor".to_string()))?;

        let values = [
            DynSolValue::Array(self.signers.iter().copied().map(DynSolValue::Address).collect()),
            DynSolValue::Uint(U256::from(self.required_approvals), 8),
            DynSolValue::Uint(U256::from(self.delay), 256),
        ];

        constructor
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ManifestError::EncodingError(e.to_string()))
    }
}

/// The contract's JSON ABI
pub fn interface() -> Result<JsonAbi, ManifestError> {
    JsonAbi::parse(HUMAN_READABLE_ABI.iter().copied())
        .map_err(|e| ManifestError::InvalidInterface(e.to_string()))
}

/// Hand-off document for an external deployer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeploymentManifest {
    pub contract: String,
    pub network: NetworkConfig,
    pub constructor: ConstructorArgs,
    /// ABI-encoded constructor arguments, appended to the bytecode on deploy
    pub constructor_data: Bytes,
    pub interface: JsonAbi,
    pub generated_at: DateTime<Utc>,
}

impl DeploymentManifest {
    /// Build a manifest for a config whose signers are EVM addresses
    pub fn new(config: &RegistryConfig, network: NetworkConfig) -> Result<Self, ManifestError> {
        Self::with_constructor(ConstructorArgs::from_config(config)?, network)
    }

    /// Build a manifest from already resolved constructor arguments
    pub fn with_constructor(
        constructor: ConstructorArgs,
        network: NetworkConfig,
    ) -> Result<Self, ManifestError> {
        network.validate()?;

        let interface = interface()?;
        let constructor_data = constructor.encode(&interface)?;

        Ok(Self {
            contract: CONTRACT_NAME.to_string(),
            network,
            constructor,
            constructor_data,
            interface,
            generated_at: Utc::now(),
        })
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.interface.function(name).and_then(|f| f.first())
    }

    /// Find an event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.interface.event(name).and_then(|e| e.first())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the manifest to `path`
    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
