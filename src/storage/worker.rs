use std::collections::HashSet;

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::storage::error::{StorageError, StorageResult};

/// Raw keyed CRUD over a storage medium.
///
/// Implementations may block on I/O and may fail with any [`StorageError`];
/// only the [`StorageManager`](crate::storage::manager::StorageManager) calls them.
/// Deleting an absent record must succeed.
pub trait StorageWorker: Send + Sync {
    fn read_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<Vec<Credential>>;

    /// Upsert each credential into its slot. No cross-record atomicity is promised.
    fn write_credentials(&self, credentials: &[Credential]) -> StorageResult<()>;

    fn delete_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<()>;

    fn read_account(
        &self,
        home_account_id: &str,
        environment: &str,
        realm: &str,
    ) -> StorageResult<Option<Account>>;

    /// Replace the full account record.
    fn write_account(&self, account: &Account) -> StorageResult<()>;

    fn delete_account(&self, home_account_id: &str, environment: &str, realm: &str)
        -> StorageResult<()>;

    /// Remove every account of `home_account_id` in `environment` across realms,
    /// together with that account's credentials.
    fn delete_accounts(&self, home_account_id: &str, environment: &str) -> StorageResult<()>;

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>>;

    fn read_app_metadata(&self, environment: &str, client_id: &str)
        -> StorageResult<Option<AppMetadata>>;

    fn write_app_metadata(&self, app_metadata: &AppMetadata) -> StorageResult<()>;

    /// Export the whole store as an opaque blob.
    fn serialize(&self) -> StorageResult<Vec<u8>> {
        Err(StorageError::Unsupported("serialize"))
    }

    /// Replace the whole store with a blob produced by [`StorageWorker::serialize`].
    fn deserialize(&self, _bytes: &[u8]) -> StorageResult<()> {
        Err(StorageError::Unsupported("deserialize"))
    }
}
