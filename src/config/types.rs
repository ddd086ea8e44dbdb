use std::path::PathBuf;

use serde::Deserialize;

use crate::adapter::AdapterKind;
use crate::config::settings::SettingsConfig;

/// ================================
/// Root config
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub cache: CacheConfig,
}

/// ================================
/// Token cache
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub client_id: String,
    /// Explicit adapter strategy; there is no process-wide switch.
    #[serde(default)]
    pub adapter: AdapterKind,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    File {
        path: PathBuf,
    },
}

impl StorageConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            StorageConfig::File { .. } => "file",
        }
    }
}
