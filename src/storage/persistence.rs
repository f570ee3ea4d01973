//! Registry persistence layer
//!
//! Saves the registry as pretty JSON. Writes go to a temp file that is
//! renamed over the previous state, so a crash never leaves a partial file.

use crate::registry::{MessageRegistry, RegistryError};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Corrupt registry: {0}")]
    Corrupt(#[from] RegistryError),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub registry_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".zeek_data"),
            registry_file: "registry.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Registry storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    fn registry_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.registry_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.registry_file, index))
    }

    /// Save the registry to disk
    pub fn save(&self, registry: &MessageRegistry) -> Result<(), StorageError> {
        let path = self.registry_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.registry_file));
        {
            let file = fs::File::create(&temp_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, registry)?;
        }

        fs::rename(&temp_path, &path)?;
        log::debug!("Registry saved to {:?}", path);

        Ok(())
    }

    /// Load the registry from disk
    pub fn load(&self) -> Result<MessageRegistry, StorageError> {
        let path = self.registry_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Registry file not found".to_string(),
            ));
        }

        load_from_file(&path)
    }

    /// Check if a saved registry exists
    pub fn exists(&self) -> bool {
        self.registry_path().exists()
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup (0 is the most recent)
    pub fn restore_backup(&self, backup_index: usize) -> Result<MessageRegistry, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.registry_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Save registry to a specific file path
pub fn save_to_file(registry: &MessageRegistry, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, registry)?;
    Ok(())
}

/// Load registry from a specific file path and check its consistency
pub fn load_from_file(path: &Path) -> Result<MessageRegistry, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let registry: MessageRegistry = serde_json::from_reader(reader)?;
    registry.validate()?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;
    use crate::registry::{CallContext, RegistryConfig};

    fn sample_registry() -> MessageRegistry {
        let alice = Address::from("alice");
        let config = RegistryConfig::new(vec![alice.clone()], 1, 60).unwrap();
        MessageRegistry::new(config, &CallContext::at(alice, 1_000))
    }

    fn storage_in(dir: &Path, max_backups: usize) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_save_load_registry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);

        let mut registry = sample_registry();
        registry
            .send_message("stored", &CallContext::at(Address::from("alice"), 1_001))
            .unwrap();

        storage.save(&registry).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.total_message_count(), 1);
        assert_eq!(loaded.last_message_content().unwrap(), "stored");
        assert_eq!(loaded.events(), registry.events());
    }

    #[test]
    fn test_load_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 3);
        let mut registry = sample_registry();

        for i in 0..5u64 {
            storage.save(&registry).unwrap();
            registry
                .send_message(format!("m{}", i), &CallContext::at(Address::from("alice"), 2_000 + i))
                .unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);

        // Most recent backup is the state before the last save
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.total_message_count(), 3);
        assert!(matches!(
            storage.restore_backup(7),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_backups_disabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            backup_enabled: false,
            ..Default::default()
        })
        .unwrap();

        let registry = sample_registry();
        storage.save(&registry).unwrap();
        storage.save(&registry).unwrap();
        assert!(storage.list_backups().is_empty());

        let stats = storage.stats().unwrap();
        assert!(stats.file_size > 0);
        assert_eq!(stats.backup_count, 0);
    }

    #[test]
    fn test_corrupt_file_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("bad.json");

        let mut json = serde_json::to_value(sample_registry()).unwrap();
        json["message_nonce"] = serde_json::json!(3);
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_export_import_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");

        let registry = sample_registry();
        save_to_file(&registry, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded.admin(), registry.admin());
    }

    #[test]
    fn test_forged_acknowledgement_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("forged.json");

        let mut registry = sample_registry();
        registry
            .send_message("pending", &CallContext::at(Address::from("alice"), 1_001))
            .unwrap();

        let mut json = serde_json::to_value(&registry).unwrap();
        json["messages"][0]["state"] = serde_json::json!({
            "state": "acknowledged",
            "approvals": [],
            "executor": "mallory",
            "acknowledged_at": 0,
        });
        fs::write(&path, json.to_string()).unwrap();

        assert!(matches!(
            load_from_file(&path),
            Err(StorageError::Corrupt(_))
        ));
    }
}
