use std::collections::HashSet;

use parking_lot::RwLock;

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::storage::error::StorageResult;
use crate::storage::snapshot::CacheSnapshot;
use crate::storage::worker::StorageWorker;

/// Process-local worker; state lives as long as the value.
#[derive(Debug, Default)]
pub struct InMemoryStorageWorker {
    inner: RwLock<CacheSnapshot>,
}

impl InMemoryStorageWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        self.inner.read().clone()
    }
}

impl StorageWorker for InMemoryStorageWorker {
    fn read_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<Vec<Credential>> {
        Ok(self.inner.read().find_credentials(key, types))
    }

    fn write_credentials(&self, credentials: &[Credential]) -> StorageResult<()> {
        self.inner.write().upsert_credentials(credentials);
        Ok(())
    }

    fn delete_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> StorageResult<()> {
        self.inner.write().remove_credentials(key, types);
        Ok(())
    }

    fn read_account(
        &self,
        home_account_id: &str,
        environment: &str,
        realm: &str,
    ) -> StorageResult<Option<Account>> {
        Ok(self.inner.read().find_account(home_account_id, environment, realm))
    }

    fn write_account(&self, account: &Account) -> StorageResult<()> {
        self.inner.write().upsert_account(account);
        Ok(())
    }

    fn delete_account(&self, home_account_id: &str, environment: &str, realm: &str) -> StorageResult<()> {
        self.inner.write().remove_account(home_account_id, environment, realm);
        Ok(())
    }

    fn delete_accounts(&self, home_account_id: &str, environment: &str) -> StorageResult<()> {
        self.inner.write().remove_accounts(home_account_id, environment);
        Ok(())
    }

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>> {
        Ok(self.inner.read().accounts.clone())
    }

    fn read_app_metadata(&self, environment: &str, client_id: &str) -> StorageResult<Option<AppMetadata>> {
        Ok(self.inner.read().find_app_metadata(environment, client_id))
    }

    fn write_app_metadata(&self, app_metadata: &AppMetadata) -> StorageResult<()> {
        self.inner.write().upsert_app_metadata(app_metadata);
        Ok(())
    }

    fn serialize(&self) -> StorageResult<Vec<u8>> {
        Ok(self.inner.read().to_bytes()?)
    }

    fn deserialize(&self, bytes: &[u8]) -> StorageResult<()> {
        let snapshot = CacheSnapshot::from_bytes(bytes)?;
        *self.inner.write() = snapshot;
        Ok(())
    }
}
