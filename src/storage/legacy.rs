use crate::cache::account::Account;
use crate::storage::error::{StorageError, StorageResult};

/// Lookup key into the prior-generation cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyCacheKey {
    pub environment: String,
    /// Empty addresses every client of the user.
    pub client_id: String,
    pub home_account_id: String,
}

impl LegacyCacheKey {
    pub fn new(
        environment: impl Into<String>,
        client_id: impl Into<String>,
        home_account_id: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            client_id: client_id.into(),
            home_account_id: home_account_id.into(),
        }
    }
}

/// Read path into the legacy cache format, consulted while migrating.
pub trait LegacyCacheBridge: Send + Sync {
    fn get_legacy_refresh_token(&self, key: &LegacyCacheKey) -> StorageResult<Option<String>>;

    fn remove_legacy_user(&self, key: &LegacyCacheKey) -> StorageResult<()>;

    fn get_all_legacy_users(&self) -> StorageResult<Vec<Account>>;

    /// Explicit migration write of a refresh token into the legacy format.
    fn write_legacy_refresh_token(&self, _key: &LegacyCacheKey, _secret: &str) -> StorageResult<()> {
        Err(StorageError::Unsupported("write_legacy_refresh_token"))
    }
}
