use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};

/// Whole-store document shared by the bundled workers.
///
/// Records keep insertion order; a write into an occupied slot replaces the
/// record in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub app_metadata: Vec<AppMetadata>,
}

impl CacheSnapshot {
    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn find_credentials(
        &self,
        key: &CredentialKey,
        types: &HashSet<CredentialType>,
    ) -> Vec<Credential> {
        self.credentials
            .iter()
            .filter(|c| types.contains(&c.credential_type) && c.matches(key))
            .cloned()
            .collect()
    }

    pub fn upsert_credentials(&mut self, credentials: &[Credential]) {
        for credential in credentials {
            match self.credentials.iter_mut().find(|c| c.same_slot(credential)) {
                Some(slot) => *slot = credential.clone(),
                None => self.credentials.push(credential.clone()),
            }
        }
    }

    pub fn remove_credentials(&mut self, key: &CredentialKey, types: &HashSet<CredentialType>) {
        self.credentials
            .retain(|c| !(types.contains(&c.credential_type) && c.matches(key)));
    }

    pub fn find_account(&self, home_account_id: &str, environment: &str, realm: &str) -> Option<Account> {
        self.accounts
            .iter()
            .find(|a| a.matches(home_account_id, environment, realm))
            .cloned()
    }

    pub fn upsert_account(&mut self, account: &Account) {
        match self.accounts.iter_mut().find(|a| a.same_slot(account)) {
            Some(slot) => *slot = account.clone(),
            None => self.accounts.push(account.clone()),
        }
    }

    pub fn remove_account(&mut self, home_account_id: &str, environment: &str, realm: &str) {
        self.accounts
            .retain(|a| !a.matches(home_account_id, environment, realm));
    }

    pub fn remove_accounts(&mut self, home_account_id: &str, environment: &str) {
        self.accounts
            .retain(|a| !(a.home_account_id == home_account_id && a.environment == environment));
        self.credentials.retain(|c| {
            !(c.home_account_id() == home_account_id && c.environment() == environment)
        });
    }

    pub fn find_app_metadata(&self, environment: &str, client_id: &str) -> Option<AppMetadata> {
        self.app_metadata
            .iter()
            .find(|m| m.matches(environment, client_id))
            .cloned()
    }

    pub fn upsert_app_metadata(&mut self, app_metadata: &AppMetadata) {
        match self
            .app_metadata
            .iter_mut()
            .find(|m| m.matches(&app_metadata.environment, &app_metadata.client_id))
        {
            Some(slot) => *slot = app_metadata.clone(),
            None => self.app_metadata.push(app_metadata.clone()),
        }
    }
}
