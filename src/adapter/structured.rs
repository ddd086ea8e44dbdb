use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::adapter::{AdapterError, AdapterKind, TokenCacheAdapter, TokenCacheHandle};
use crate::cache::account::Account;
use crate::cache::cache_manager::{CacheManager, CacheReadResult};
use crate::cache::token_response::TokenResponse;
use crate::request::auth_parameters::AuthParameters;
use crate::storage::error::StorageError;
use crate::storage::manager::StorageManager;
use crate::storage::status::OperationStatus;

/// Token cache object whose content lives behind a [`StorageManager`].
#[derive(Debug, Default)]
pub struct StructuredTokenCache {
    storage_manager: RwLock<Option<Arc<StorageManager>>>,
}

impl StructuredTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_to_storage_manager(&self, storage_manager: Arc<StorageManager>) {
        *self.storage_manager.write() = Some(storage_manager);
    }

    pub fn storage_manager(&self) -> Option<Arc<StorageManager>> {
        self.storage_manager.read().clone()
    }

    /// Whole-cache export through the bound storage manager.
    pub fn serialize(&self) -> OperationStatus<Vec<u8>> {
        match self.storage_manager() {
            Some(manager) => manager.serialize(),
            None => OperationStatus::Failure(unbound().into()),
        }
    }

    pub fn deserialize(&self, bytes: &[u8]) -> OperationStatus {
        match self.storage_manager() {
            Some(manager) => manager.deserialize(bytes),
            None => OperationStatus::Failure(unbound().into()),
        }
    }
}

fn unbound() -> StorageError {
    StorageError::Backend("token cache is not bound to a storage manager".to_owned())
}

pub struct StructuredTokenCacheAdapter {
    storage_manager: Arc<StorageManager>,
    token_cache: Mutex<Option<Arc<StructuredTokenCache>>>,
}

impl StructuredTokenCacheAdapter {
    pub fn new(storage_manager: Arc<StorageManager>) -> Self {
        Self {
            storage_manager,
            token_cache: Mutex::new(None),
        }
    }

    /// Storage manager of the bound cache; the lock is held only for the clone.
    fn bound_storage_manager(&self) -> Option<Arc<StorageManager>> {
        let cache = self.token_cache.lock().clone();
        match cache {
            Some(cache) => cache.storage_manager(),
            None => {
                debug!("structured adapter: no token cache bound");
                None
            }
        }
    }
}

impl TokenCacheAdapter for StructuredTokenCacheAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Structured
    }

    fn token_cache(&self) -> Option<TokenCacheHandle> {
        self.token_cache.lock().clone().map(TokenCacheHandle::Structured)
    }

    fn set_token_cache(&self, cache: Option<TokenCacheHandle>) -> Result<(), AdapterError> {
        let mut guard = self.token_cache.lock();
        match cache {
            None => *guard = None,
            Some(TokenCacheHandle::Structured(cache)) => {
                cache.bind_to_storage_manager(self.storage_manager.clone());
                *guard = Some(cache);
            }
            Some(other) => {
                return Err(AdapterError::IncompatibleCache {
                    adapter: AdapterKind::Structured,
                    cache: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn try_read_cache(&self, auth_parameters: &AuthParameters) -> Option<CacheReadResult> {
        let manager = self.bound_storage_manager()?;
        CacheManager::new(&manager, auth_parameters).try_read_cache()
    }

    fn save_token_response(
        &self,
        auth_parameters: &AuthParameters,
        response: &TokenResponse,
    ) -> Option<Account> {
        let manager = self.bound_storage_manager()?;
        CacheManager::new(&manager, auth_parameters).cache_token_response(response)
    }

    fn delete_cached_refresh_token(&self, auth_parameters: &AuthParameters) {
        if let Some(manager) = self.bound_storage_manager() {
            CacheManager::new(&manager, auth_parameters).delete_cached_refresh_token();
        }
    }

    fn get_accounts(&self, environment: &str) -> Vec<Account> {
        let Some(manager) = self.bound_storage_manager() else {
            return Vec::new();
        };
        match manager.read_all_accounts() {
            OperationStatus::Success(accounts) => accounts
                .into_iter()
                .filter(|a| environment.is_empty() || a.environment == environment)
                .collect(),
            OperationStatus::Failure(failure) => {
                warn!("listing accounts failed: {}", failure.description);
                Vec::new()
            }
        }
    }

    fn remove_account(&self, account: &Account) -> OperationStatus {
        match self.bound_storage_manager() {
            Some(manager) => {
                manager.delete_account(&account.home_account_id, &account.environment, &account.realm)
            }
            None => OperationStatus::Failure(unbound().into()),
        }
    }
}
