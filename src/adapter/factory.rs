//! Builds adapters, caches and storage from explicit configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapter::legacy::{LegacyTokenCache, LegacyTokenCacheAdapter};
use crate::adapter::structured::{StructuredTokenCache, StructuredTokenCacheAdapter};
use crate::adapter::{AdapterKind, TokenCacheAdapter, TokenCacheHandle};
use crate::config::types::{CacheConfig, StorageConfig};
use crate::storage::file::FileStorageWorker;
use crate::storage::manager::StorageManager;
use crate::storage::memory::InMemoryStorageWorker;
use crate::storage::worker::StorageWorker;

pub fn create_token_cache(kind: AdapterKind) -> TokenCacheHandle {
    match kind {
        AdapterKind::Legacy => TokenCacheHandle::Legacy(Arc::new(LegacyTokenCache::new())),
        AdapterKind::Structured => TokenCacheHandle::Structured(Arc::new(StructuredTokenCache::new())),
    }
}

/// Unbound adapter of the given kind. The storage manager is only used by the
/// structured variant.
pub fn create_token_cache_adapter(
    kind: AdapterKind,
    client_id: &str,
    storage_manager: Arc<StorageManager>,
) -> Box<dyn TokenCacheAdapter> {
    match kind {
        AdapterKind::Legacy => Box::new(LegacyTokenCacheAdapter::new(client_id)),
        AdapterKind::Structured => Box::new(StructuredTokenCacheAdapter::new(storage_manager)),
    }
}

pub fn create_storage_worker(storage: &StorageConfig) -> Arc<dyn StorageWorker> {
    match storage {
        StorageConfig::Memory => Arc::new(InMemoryStorageWorker::new()),
        StorageConfig::File { path } => Arc::new(FileStorageWorker::new(path.clone())),
    }
}

pub fn create_storage_manager(storage: &StorageConfig) -> Arc<StorageManager> {
    Arc::new(StorageManager::new(create_storage_worker(storage)))
}

/// Adapter with a freshly created token cache of the configured kind bound to it.
pub fn create_bound_adapter(config: &CacheConfig) -> Result<Box<dyn TokenCacheAdapter>> {
    let storage_manager = create_storage_manager(&config.storage);
    let adapter = create_token_cache_adapter(config.adapter, &config.client_id, storage_manager);
    adapter
        .set_token_cache(Some(create_token_cache(config.adapter)))
        .context("binding token cache")?;

    info!(
        "token cache adapter ready: adapter={}, storage={}",
        config.adapter.as_str(),
        config.storage.as_str()
    );
    Ok(adapter)
}
