//! CLI commands for the message registry
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::Address;
use crate::deploy::{parse_evm_address, ConstructorArgs, DeploymentManifest, NetworkConfig};
use crate::registry::{CallContext, MessageRegistry, MessageStatus, RegistryConfig, RegistryEvent};
use crate::storage::{Storage, StorageConfig};
use crate::wallet::WalletManager;
use chrono::{TimeZone, Utc};
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Application state
pub struct AppState {
    pub registry: MessageRegistry,
    pub storage: Storage,
    pub wallet_manager: WalletManager,
    pub data_dir: PathBuf,
}

fn storage_for(data_dir: &Path) -> CliResult<Storage> {
    let storage_config = StorageConfig {
        data_dir: data_dir.to_path_buf(),
        ..Default::default()
    };
    Ok(Storage::new(storage_config)?)
}

fn wallets_for(data_dir: &Path) -> CliResult<WalletManager> {
    Ok(WalletManager::new(&data_dir.join("signers"))?)
}

fn format_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|t| Utc.timestamp_opt(t, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn describe_event(event: &RegistryEvent) -> String {
    match event {
        RegistryEvent::MessageReceived {
            nonce,
            content,
            timestamp,
        } => format!(
            "📨 MessageReceived    #{} \"{}\" (releases {})",
            nonce,
            content,
            format_time(*timestamp)
        ),
        RegistryEvent::MessageApproved { nonce, approver } => {
            format!("✍️  MessageApproved    #{} by {}", nonce, approver)
        }
        RegistryEvent::MessageAcknowledged { nonce, executor } => {
            format!("✅ MessageAcknowledged #{} by {}", nonce, executor)
        }
    }
}

impl AppState {
    /// Load application state; the registry must already be initialized
    pub fn load(data_dir: PathBuf) -> CliResult<Self> {
        let storage = storage_for(&data_dir)?;
        if !storage.exists() {
            return Err(format!(
                "no registry found in {:?}; run `zeek init` first",
                data_dir
            )
            .into());
        }

        let registry = storage.load()?;
        let wallet_manager = wallets_for(&data_dir)?;

        Ok(Self {
            registry,
            storage,
            wallet_manager,
            data_dir,
        })
    }

    /// Save the current state
    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.registry)?;
        Ok(())
    }

    /// Build a call context for `from`, which must be a locally held key
    pub fn caller(&self, from: &Address) -> CliResult<CallContext> {
        let wallet = self.wallet_manager.load_wallet(from)?;
        Ok(CallContext::now(wallet.address()))
    }
}

/// Create a new signer key
pub fn cmd_signer_new(data_dir: &Path, label: Option<&str>) -> CliResult<()> {
    let wallet = wallets_for(data_dir)?.create_wallet(label)?;

    println!("🔐 New signer key created!");
    println!("   📍 Address: {}", wallet.address());
    println!("   🔑 Public Key: {}", wallet.public_key());
    if let Some(l) = &wallet.label {
        println!("   🏷️  Label: {}", l);
    }
    println!("\n   ⚠️  The private key is stored in {:?}", data_dir.join("signers"));

    Ok(())
}

/// Import a signer key from a hex private key
pub fn cmd_signer_import(data_dir: &Path, private_key: &str, label: Option<&str>) -> CliResult<()> {
    let wallet = wallets_for(data_dir)?.import_wallet(private_key, label)?;

    println!("📥 Signer key imported");
    println!("   📍 Address: {}", wallet.address());

    Ok(())
}

/// List local signer keys
pub fn cmd_signer_list(data_dir: &Path) -> CliResult<()> {
    let manager = wallets_for(data_dir)?;
    let addresses = manager.list_wallets()?;

    if addresses.is_empty() {
        println!("📭 No signer keys found. Create one with: zeek signer new");
        return Ok(());
    }

    // Registry is optional here; mark authorized keys when it exists
    let storage = storage_for(data_dir)?;
    let registry = if storage.exists() {
        Some(storage.load()?)
    } else {
        None
    };

    println!("📋 Signer keys:");
    for address in &addresses {
        let wallet = manager.load_wallet(address)?;
        let label = wallet.label.as_deref().unwrap_or("-");
        let role = match &registry {
            Some(r) if r.is_authorized_signer(address) => "authorized",
            Some(_) => "not authorized",
            None => "no registry",
        };
        println!("   {} ({}) - {}", address, label, role);
    }

    Ok(())
}

/// Print a signer's public details as JSON
pub fn cmd_signer_show(data_dir: &Path, address: &Address) -> CliResult<()> {
    let wallet = wallets_for(data_dir)?.load_wallet(address)?;
    println!("{}", serde_json::to_string_pretty(&wallet.export_public_info())?);
    Ok(())
}

/// Remove a local signer key
pub fn cmd_signer_delete(data_dir: &Path, address: &Address) -> CliResult<()> {
    let storage = storage_for(data_dir)?;
    if storage.exists() && storage.load()?.is_authorized_signer(address) {
        log::warn!("deleting the local key of authorized signer {}", address);
    }

    wallets_for(data_dir)?.delete_wallet(address)?;
    println!("🗑️  Signer key {} deleted", address);
    Ok(())
}

/// Construct a new registry
pub fn cmd_init(
    data_dir: &Path,
    from: &Address,
    signers: Vec<Address>,
    required_approvals: u8,
    delay: u64,
) -> CliResult<()> {
    let storage = storage_for(data_dir)?;

    if storage.exists() {
        return Err(format!(
            "registry already exists in {:?}; use a different --data-dir",
            data_dir
        )
        .into());
    }

    let wallet = wallets_for(data_dir)?.load_wallet(from)?;
    let config = RegistryConfig::new(signers, required_approvals, delay)?;
    let registry = MessageRegistry::new(config, &CallContext::now(wallet.address()));

    storage.save(&registry)?;

    println!("✅ Registry initialized!");
    println!("   📁 Data directory: {:?}", data_dir);
    println!("   👤 Admin: {}", registry.admin());
    println!("   🔏 Quorum: {}", registry.config().description());
    println!("   ⏳ Base delay: {}s", registry.base_delay());
    for event in registry.events() {
        println!("   {}", describe_event(event));
    }

    Ok(())
}

/// Submit a message
pub fn cmd_send(state: &mut AppState, from: &Address, message: &str) -> CliResult<()> {
    let ctx = state.caller(from)?;

    let nonce = state.registry.send_message(message, &ctx).map_err(|e| {
        log::warn!("send rejected for {}: {}", from, e);
        e
    })?;
    state.save()?;

    let record = state
        .registry
        .message(nonce)
        .ok_or("message vanished after submission")?;
    println!("📨 Message #{} submitted", nonce);
    println!("   ├─ Content: {}", record.content);
    println!("   ├─ Release time: {}", format_time(record.release_time));
    println!(
        "   └─ Approvals: 0/{}",
        state.registry.required_approvals()
    );

    Ok(())
}

/// Approve a message
pub fn cmd_approve(state: &mut AppState, from: &Address, nonce: u64) -> CliResult<()> {
    let ctx = state.caller(from)?;

    let count = state.registry.approve_message(nonce, &ctx).map_err(|e| {
        log::warn!("approve #{} rejected for {}: {}", nonce, from, e);
        e
    })?;
    state.save()?;

    println!(
        "✍️  Message #{} approved by {} ({}/{})",
        nonce,
        from,
        count,
        state.registry.required_approvals()
    );

    Ok(())
}

/// Acknowledge a message
pub fn cmd_acknowledge(state: &mut AppState, from: &Address, nonce: u64) -> CliResult<()> {
    let ctx = state.caller(from)?;

    state
        .registry
        .acknowledge_message(nonce, &ctx)
        .map_err(|e| {
            log::warn!("acknowledge #{} rejected for {}: {}", nonce, from, e);
            e
        })?;
    state.save()?;

    println!("✅ Message #{} acknowledged by {}", nonce, from);

    Ok(())
}

/// Show registry overview
pub fn cmd_info(state: &AppState) -> CliResult<()> {
    let registry = &state.registry;
    let stats = state.storage.stats()?;

    println!("📒 Registry Info");
    println!("   ├─ Admin: {}", registry.admin());
    println!("   ├─ Quorum: {}", registry.config().description());
    println!("   ├─ Base delay: {}s", registry.base_delay());
    println!("   ├─ Messages: {}", registry.total_message_count());
    println!("   ├─ Events: {}", registry.events().len());
    println!("   ├─ Backups: {}", stats.backup_count);
    println!("   └─ Signers:");
    for signer in registry.signers() {
        println!("      • {}", signer);
    }

    Ok(())
}

/// Print the total message count
pub fn cmd_count(state: &AppState) -> CliResult<()> {
    println!("{}", state.registry.total_message_count());
    Ok(())
}

/// Print the content of the last message
pub fn cmd_last(state: &AppState) -> CliResult<()> {
    let content = state.registry.last_message_content()?;
    println!("{}", content);
    Ok(())
}

/// Show one message
pub fn cmd_show(state: &AppState, nonce: u64) -> CliResult<()> {
    let registry = &state.registry;
    let record = registry
        .message(nonce)
        .ok_or_else(|| format!("message #{} not found", nonce))?;
    let now = Utc::now().timestamp().max(0) as u64;

    println!("📨 Message #{}", record.nonce);
    println!("   ├─ Content: {}", record.content);
    println!(
        "   ├─ Submitted: {} by {}",
        format_time(record.submitted_at),
        record.submitted_by
    );
    println!("   ├─ Release time: {}", format_time(record.release_time));
    println!(
        "   ├─ Approvals: {}/{}",
        record.approval_count(),
        registry.required_approvals()
    );
    for approver in record.approvals() {
        println!("   │   • {}", approver);
    }
    println!("   └─ Status: {:?}", record.status(registry.required_approvals(), now));
    if let Some(executor) = record.executor() {
        println!("      Acknowledged by {}", executor);
    }

    Ok(())
}

/// List all messages
pub fn cmd_list(state: &AppState) -> CliResult<()> {
    let registry = &state.registry;
    if registry.total_message_count() == 0 {
        println!("📭 No messages sent to Zeek yet!");
        return Ok(());
    }

    let now = Utc::now().timestamp().max(0) as u64;
    println!("📋 Messages:");
    for record in registry.messages() {
        let status = record.status(registry.required_approvals(), now);
        let marker = match status {
            MessageStatus::Pending => "⏸️ ",
            MessageStatus::AwaitingRelease => "⏳",
            MessageStatus::Acknowledgeable => "🔓",
            MessageStatus::Acknowledged => "✅",
        };
        println!(
            "   {} #{} | {}/{} | {} | {}",
            marker,
            record.nonce,
            record.approval_count(),
            registry.required_approvals(),
            format_time(record.release_time),
            record.content
        );
    }

    Ok(())
}

/// Print the event log
pub fn cmd_events(state: &AppState, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state.registry.events())?);
        return Ok(());
    }

    println!("📜 Events:");
    for event in state.registry.events() {
        println!("   {}", describe_event(event));
    }

    Ok(())
}

/// Write or print the deployment manifest
///
/// Signers given as `0x` addresses are used as-is; local keys are mapped to
/// the EVM address of the same key.
pub fn cmd_manifest(state: &AppState, network: NetworkConfig, output: Option<&Path>) -> CliResult<()> {
    let constructor = ConstructorArgs::resolve(state.registry.config(), |signer| {
        parse_evm_address(signer).or_else(|| {
            state
                .wallet_manager
                .load_wallet(signer)
                .ok()
                .map(|w| w.evm_address())
        })
    })?;
    let manifest = DeploymentManifest::with_constructor(constructor, network)?;

    match output {
        Some(path) => {
            manifest.write(path)?;
            println!("📦 Deployment manifest written to {:?}", path);
            println!(
                "   Chain {} via {}",
                manifest.network.chain_id, manifest.network.rpc_url
            );
        }
        None => println!("{}", manifest.to_json()?),
    }

    Ok(())
}

/// Export registry to file
pub fn cmd_export(state: &AppState, path: &Path) -> CliResult<()> {
    crate::storage::save_to_file(&state.registry, path)?;
    println!("📦 Registry exported to {:?}", path);
    Ok(())
}

/// Import registry from file
pub fn cmd_import(state: &mut AppState, path: &Path) -> CliResult<()> {
    let registry = crate::storage::load_from_file(path)?;

    state.registry = registry;
    state.save()?;

    println!("📥 Registry imported from {:?}", path);
    println!("   Messages: {}", state.registry.total_message_count());

    Ok(())
}

/// Replace the registry with one of its backups (0 is the most recent)
pub fn cmd_restore(state: &mut AppState, backup_index: usize) -> CliResult<()> {
    let registry = state.storage.restore_backup(backup_index)?;

    state.registry = registry;
    state.save()?;

    println!("♻️  Registry restored from backup {}", backup_index);
    println!("   Messages: {}", state.registry.total_message_count());

    Ok(())
}
