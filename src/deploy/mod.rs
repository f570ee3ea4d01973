//! Deployment hand-off
//!
//! Describes the registry for an external deployer. No network access
//! happens here.

pub mod manifest;

pub use manifest::{
    interface, parse_evm_address, ConstructorArgs, DeploymentManifest, EvmAddress, ManifestError,
    NetworkConfig, CONTRACT_NAME, DEFAULT_CHAIN_ID, DEFAULT_GAS_LIMIT, DEFAULT_RPC_URL,
};
