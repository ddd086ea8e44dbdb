//! Token cache adapters: the request pipeline's view of the cache.
//!
//! An adapter is built for one [`AdapterKind`] and binds exactly one backing
//! token cache of that kind at a time. The adapter lock only guards the bound
//! reference; storage concurrency belongs to the storage layer.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::cache::account::Account;
use crate::cache::cache_manager::CacheReadResult;
use crate::cache::token_response::TokenResponse;
use crate::request::auth_parameters::AuthParameters;
use crate::storage::status::OperationStatus;

pub mod factory;
pub mod legacy;
pub mod structured;

use legacy::LegacyTokenCache;
use structured::StructuredTokenCache;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Monolithic prior-generation cache object.
    Legacy,
    /// Cache Manager over the Storage Manager.
    #[default]
    Structured,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            AdapterKind::Legacy => "legacy",
            AdapterKind::Structured => "structured",
        }
    }
}

/// A backing token cache an adapter can bind.
#[derive(Debug, Clone)]
pub enum TokenCacheHandle {
    Legacy(Arc<LegacyTokenCache>),
    Structured(Arc<StructuredTokenCache>),
}

impl TokenCacheHandle {
    pub fn kind(&self) -> AdapterKind {
        match self {
            TokenCacheHandle::Legacy(_) => AdapterKind::Legacy,
            TokenCacheHandle::Structured(_) => AdapterKind::Structured,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdapterError {
    #[error("{} token cache adapter cannot bind a {} token cache", adapter.as_str(), cache.as_str())]
    IncompatibleCache {
        adapter: AdapterKind,
        cache: AdapterKind,
    },
}

/// Cache operations exposed to request orchestration.
///
/// While no token cache is bound every read yields nothing and every write is
/// a no-op returning nothing.
pub trait TokenCacheAdapter: Send + Sync {
    fn kind(&self) -> AdapterKind;

    fn token_cache(&self) -> Option<TokenCacheHandle>;

    /// Bind (`Some`) or unbind (`None`). A cache of another kind is rejected.
    fn set_token_cache(&self, cache: Option<TokenCacheHandle>) -> Result<(), AdapterError>;

    fn is_bound(&self) -> bool {
        self.token_cache().is_some()
    }

    fn try_read_cache(&self, auth_parameters: &AuthParameters) -> Option<CacheReadResult>;

    fn save_token_response(
        &self,
        auth_parameters: &AuthParameters,
        response: &TokenResponse,
    ) -> Option<Account>;

    fn delete_cached_refresh_token(&self, auth_parameters: &AuthParameters);

    /// Accounts known in `environment`; an empty environment lists all.
    fn get_accounts(&self, environment: &str) -> Vec<Account>;

    /// Failure while no token cache is bound.
    fn remove_account(&self, account: &Account) -> OperationStatus;
}
