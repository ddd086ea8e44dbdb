//! Storage Manager: the only layer that sees raw storage faults.
//!
//! Each operation calls the worker once and turns its result into an
//! [`OperationStatus`]. The optional legacy bridge is a secondary source for
//! refresh tokens and legacy users; its faults are logged and never fail a
//! primary operation that succeeded.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::helpers::time::now_i64;
use crate::storage::error::StorageError;
use crate::storage::legacy::{LegacyCacheBridge, LegacyCacheKey};
use crate::storage::status::{
    OperationStatus, ReadAccountResponse, ReadAccountsResponse, ReadAppMetadataResponse,
    ReadCredentialsResponse,
};
use crate::storage::worker::StorageWorker;

#[derive(Clone)]
pub struct StorageManager {
    worker: Arc<dyn StorageWorker>,
    legacy: Option<Arc<dyn LegacyCacheBridge>>,
}

impl fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageManager")
            .field("legacy_bridge", &self.legacy.is_some())
            .finish_non_exhaustive()
    }
}

impl StorageManager {
    pub fn new(worker: Arc<dyn StorageWorker>) -> Self {
        Self {
            worker,
            legacy: None,
        }
    }

    pub fn with_legacy_bridge(worker: Arc<dyn StorageWorker>, legacy: Arc<dyn LegacyCacheBridge>) -> Self {
        Self {
            worker,
            legacy: Some(legacy),
        }
    }

    pub fn serialize(&self) -> OperationStatus<Vec<u8>> {
        OperationStatus::from_storage("serialize", self.worker.serialize())
    }

    pub fn deserialize(&self, bytes: &[u8]) -> OperationStatus {
        OperationStatus::from_storage("deserialize", self.worker.deserialize(bytes))
    }

    pub fn read_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> ReadCredentialsResponse {
        let mut credentials = match self.worker.read_credentials(key, types) {
            Ok(credentials) => credentials,
            Err(err) => return OperationStatus::from_storage("read_credentials", Err(err)),
        };

        let wants_refresh_token = types.contains(&CredentialType::RefreshToken);
        let has_refresh_token = credentials
            .iter()
            .any(|c| c.credential_type == CredentialType::RefreshToken);
        if wants_refresh_token && !has_refresh_token {
            if let Some(refresh_token) = self.legacy_refresh_token(key) {
                credentials.push(refresh_token);
            }
        }

        OperationStatus::Success(credentials)
    }

    pub fn write_credentials(&self, credentials: &[Credential]) -> OperationStatus {
        OperationStatus::from_storage("write_credentials", self.worker.write_credentials(credentials))
    }

    pub fn delete_credentials(&self, key: &CredentialKey, types: &HashSet<CredentialType>) -> OperationStatus {
        OperationStatus::from_storage("delete_credentials", self.worker.delete_credentials(key, types))
    }

    /// Structured accounts plus legacy users; structured records win on key collision.
    pub fn read_all_accounts(&self) -> ReadAccountsResponse {
        let mut accounts = match self.worker.read_all_accounts() {
            Ok(accounts) => accounts,
            Err(err) => return OperationStatus::from_storage("read_all_accounts", Err(err)),
        };

        if let Some(legacy) = &self.legacy {
            match legacy.get_all_legacy_users() {
                Ok(users) => {
                    for user in users {
                        if !accounts.iter().any(|a| a.same_slot(&user)) {
                            accounts.push(user);
                        }
                    }
                }
                Err(err) => warn!("legacy cache: reading users failed: {}", err),
            }
        }

        OperationStatus::Success(accounts)
    }

    pub fn read_account(&self, home_account_id: &str, environment: &str, realm: &str) -> ReadAccountResponse {
        OperationStatus::from_storage(
            "read_account",
            self.worker.read_account(home_account_id, environment, realm),
        )
    }

    pub fn write_account(&self, account: &Account) -> OperationStatus {
        OperationStatus::from_storage("write_account", self.worker.write_account(account))
    }

    pub fn delete_account(&self, home_account_id: &str, environment: &str, realm: &str) -> OperationStatus {
        let status = OperationStatus::from_storage(
            "delete_account",
            self.worker.delete_account(home_account_id, environment, realm),
        );

        if let Some(legacy) = &self.legacy {
            let key = LegacyCacheKey::new(environment, "", home_account_id);
            if let Err(err) = legacy.remove_legacy_user(&key) {
                warn!("legacy cache: removing user failed: {}", err);
            }
        }

        status
    }

    /// Cascading delete of every realm's account and credentials for the user.
    pub fn delete_accounts(&self, home_account_id: &str, environment: &str) -> OperationStatus {
        OperationStatus::from_storage(
            "delete_accounts",
            self.worker.delete_accounts(home_account_id, environment),
        )
    }

    pub fn read_app_metadata(&self, environment: &str, client_id: &str) -> ReadAppMetadataResponse {
        OperationStatus::from_storage(
            "read_app_metadata",
            self.worker.read_app_metadata(environment, client_id),
        )
    }

    pub fn write_app_metadata(&self, app_metadata: &AppMetadata) -> OperationStatus {
        OperationStatus::from_storage("write_app_metadata", self.worker.write_app_metadata(app_metadata))
    }

    /// Migration write of a refresh token into the legacy cache.
    pub fn write_legacy_refresh_token(&self, refresh_token: &Credential) -> OperationStatus {
        let result = match &self.legacy {
            Some(legacy) => {
                let key = LegacyCacheKey::new(
                    refresh_token.environment(),
                    refresh_token.client_id(),
                    refresh_token.home_account_id(),
                );
                legacy.write_legacy_refresh_token(&key, &refresh_token.secret)
            }
            None => Err(StorageError::Unsupported("write_legacy_refresh_token")),
        };
        OperationStatus::from_storage("write_legacy_refresh_token", result)
    }

    fn legacy_refresh_token(&self, key: &CredentialKey) -> Option<Credential> {
        let legacy = self.legacy.as_ref()?;
        let legacy_key = LegacyCacheKey::new(&key.environment, &key.client_id, &key.home_account_id);

        match legacy.get_legacy_refresh_token(&legacy_key) {
            Ok(Some(secret)) if !secret.trim().is_empty() => {
                info!("refresh token served from legacy cache");
                Some(Credential::refresh_token(key.clone(), secret, now_i64()))
            }
            Ok(_) => {
                debug!("legacy cache has no refresh token either");
                None
            }
            Err(err) => {
                warn!("legacy cache: reading refresh token failed: {}", err);
                None
            }
        }
    }
}
