//! Prior-generation monolithic token cache and its adapter.
//!
//! The legacy cache keeps every record in one in-process document and looks
//! access tokens up by scope superset instead of exact target.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::adapter::{AdapterError, AdapterKind, TokenCacheAdapter, TokenCacheHandle};
use crate::cache::account::Account;
use crate::cache::cache_manager::{home_account_id_for, CacheReadResult, CachedTokens};
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::cache::id_token::IdToken;
use crate::cache::scopes::{join_scopes, split_scopes};
use crate::cache::token_response::TokenResponse;
use crate::cache::validity::{is_access_token_valid, is_access_token_valid_at};
use crate::helpers::time::now_i64;
use crate::request::auth_parameters::AuthParameters;
use crate::storage::error::StorageError;
use crate::storage::snapshot::CacheSnapshot;
use crate::storage::status::OperationStatus;

fn scope_set(target: &str) -> HashSet<String> {
    split_scopes(target)
        .into_iter()
        .map(|s| s.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Default)]
pub struct LegacyTokenCache {
    client_id: RwLock<String>,
    entries: RwLock<CacheSnapshot>,
}

impl LegacyTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_id(&self) -> String {
        self.client_id.read().clone()
    }

    pub fn set_client_id(&self, client_id: &str) {
        *self.client_id.write() = client_id.to_owned();
    }

    /// Valid access token whose scopes cover every requested scope.
    pub fn find_access_token(&self, auth_parameters: &AuthParameters) -> Option<Credential> {
        let client_id = self.client_id();
        let requested = scope_set(&auth_parameters.target());
        if requested.is_empty() {
            return None;
        }

        self.entries
            .read()
            .credentials
            .iter()
            .filter(|c| {
                c.credential_type == CredentialType::AccessToken
                    && c.home_account_id() == auth_parameters.account_id
                    && c.environment() == auth_parameters.environment()
                    && c.realm() == auth_parameters.realm()
                    && c.client_id() == client_id
                    && requested.is_subset(&scope_set(c.target()))
            })
            .filter(|c| is_access_token_valid(c))
            .last()
            .cloned()
    }

    pub fn find_refresh_token(&self, auth_parameters: &AuthParameters) -> Option<Credential> {
        let client_id = self.client_id();
        self.entries
            .read()
            .credentials
            .iter()
            .filter(|c| {
                c.credential_type == CredentialType::RefreshToken
                    && c.home_account_id() == auth_parameters.account_id
                    && c.environment() == auth_parameters.environment()
                    && c.client_id() == client_id
            })
            .last()
            .cloned()
    }

    pub fn find_id_token(&self, access_token: &Credential) -> Option<IdToken> {
        let types = HashSet::from([CredentialType::IdToken]);
        let entries = self.entries.read();
        let credential = entries
            .find_credentials(&access_token.key.for_id_token(), &types)
            .pop()?;
        IdToken::parse(&credential.secret).ok().filter(|t| !t.is_empty())
    }

    pub fn find_account(&self, home_account_id: &str, environment: &str, realm: &str) -> Option<Account> {
        self.entries.read().find_account(home_account_id, environment, realm)
    }

    /// Store a token response. Access tokens of the same account whose scopes
    /// intersect the new grant are evicted first.
    pub fn save_token_response(
        &self,
        auth_parameters: &AuthParameters,
        response: &TokenResponse,
    ) -> Option<Account> {
        let key = CredentialKey::new(
            home_account_id_for(response),
            auth_parameters.environment(),
            auth_parameters.realm(),
            self.client_id(),
            join_scopes(&response.granted_scopes),
        );
        if let Some(missing) = key.missing_component() {
            info!("legacy cache: skipping save, '{}' is empty", missing);
            return None;
        }

        let cached_at = now_i64();
        let granted = scope_set(&key.target);
        let mut entries = self.entries.write();

        entries.credentials.retain(|c| {
            !(c.credential_type == CredentialType::AccessToken
                && c.home_account_id() == key.home_account_id
                && c.environment() == key.environment
                && c.realm() == key.realm
                && c.client_id() == key.client_id
                && !scope_set(c.target()).is_disjoint(&granted))
        });

        let mut credentials = Vec::with_capacity(3);
        if let Some(secret) = response.access_token.as_deref().filter(|_| response.has_access_token()) {
            let access_token = Credential::access_token(
                key.clone(),
                secret,
                cached_at,
                response.expires_on,
                response.extended_expires_on,
            );
            if is_access_token_valid_at(&access_token, cached_at) {
                credentials.push(access_token);
            }
        }
        if let Some(secret) = response.refresh_token.as_deref().filter(|_| response.has_refresh_token()) {
            credentials.push(Credential::refresh_token(key.clone(), secret, cached_at));
        }
        if !response.id_token.is_empty() {
            credentials.push(Credential::id_token(key.clone(), response.id_token.raw(), cached_at));
        }
        entries.upsert_credentials(&credentials);

        if response.id_token.is_empty() {
            return None;
        }
        let account = Account::from_id_token(
            &key.home_account_id,
            &key.environment,
            &key.realm,
            auth_parameters.authority.authority_type(),
            &response.id_token,
            &response.raw_client_info,
        );
        entries.upsert_account(&account);
        Some(account)
    }

    pub fn remove_refresh_token(&self, auth_parameters: &AuthParameters) {
        let client_id = self.client_id();
        self.entries.write().credentials.retain(|c| {
            !(c.credential_type == CredentialType::RefreshToken
                && c.home_account_id() == auth_parameters.account_id
                && c.environment() == auth_parameters.environment()
                && c.client_id() == client_id)
        });
    }

    /// Accounts holding a refresh token for the bound client.
    pub fn accounts(&self, environment: &str) -> Vec<Account> {
        let client_id = self.client_id();
        let entries = self.entries.read();
        entries
            .accounts
            .iter()
            .filter(|a| environment.is_empty() || a.environment == environment)
            .filter(|a| {
                entries.credentials.iter().any(|c| {
                    c.credential_type == CredentialType::RefreshToken
                        && c.client_id() == client_id
                        && c.home_account_id() == a.home_account_id
                        && c.environment() == a.environment
                })
            })
            .cloned()
            .collect()
    }

    pub fn remove_account(&self, account: &Account) {
        self.entries
            .write()
            .remove_accounts(&account.home_account_id, &account.environment);
    }
}

pub struct LegacyTokenCacheAdapter {
    client_id: String,
    token_cache: Mutex<Option<Arc<LegacyTokenCache>>>,
}

impl LegacyTokenCacheAdapter {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            token_cache: Mutex::new(None),
        }
    }

    fn bound(&self) -> Option<Arc<LegacyTokenCache>> {
        let cache = self.token_cache.lock().clone();
        if cache.is_none() {
            debug!("legacy adapter: no token cache bound");
        }
        cache
    }
}

impl TokenCacheAdapter for LegacyTokenCacheAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Legacy
    }

    fn token_cache(&self) -> Option<TokenCacheHandle> {
        self.token_cache.lock().clone().map(TokenCacheHandle::Legacy)
    }

    fn set_token_cache(&self, cache: Option<TokenCacheHandle>) -> Result<(), AdapterError> {
        let mut guard = self.token_cache.lock();
        match cache {
            None => *guard = None,
            Some(TokenCacheHandle::Legacy(cache)) => {
                cache.set_client_id(&self.client_id);
                *guard = Some(cache);
            }
            Some(other) => {
                return Err(AdapterError::IncompatibleCache {
                    adapter: AdapterKind::Legacy,
                    cache: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn try_read_cache(&self, auth_parameters: &AuthParameters) -> Option<CacheReadResult> {
        let cache = self.bound()?;
        let access_token = cache.find_access_token(auth_parameters);
        let refresh_token = cache.find_refresh_token(auth_parameters);
        if access_token.is_none() && refresh_token.is_none() {
            return None;
        }

        let (id_token, account) = match &access_token {
            Some(at) => (
                cache.find_id_token(at),
                cache.find_account(at.home_account_id(), at.environment(), at.realm()),
            ),
            None => (None, None),
        };

        Some(CacheReadResult {
            tokens: CachedTokens {
                id_token,
                access_token,
                refresh_token,
            },
            account,
        })
    }

    fn save_token_response(
        &self,
        auth_parameters: &AuthParameters,
        response: &TokenResponse,
    ) -> Option<Account> {
        info!("saving token response to legacy cache");
        self.bound()?.save_token_response(auth_parameters, response)
    }

    fn delete_cached_refresh_token(&self, auth_parameters: &AuthParameters) {
        if let Some(cache) = self.bound() {
            cache.remove_refresh_token(auth_parameters);
        }
    }

    fn get_accounts(&self, environment: &str) -> Vec<Account> {
        self.bound()
            .map(|cache| cache.accounts(environment))
            .unwrap_or_default()
    }

    fn remove_account(&self, account: &Account) -> OperationStatus {
        match self.bound() {
            Some(cache) => {
                cache.remove_account(account);
                OperationStatus::Success(())
            }
            None => OperationStatus::Failure(
                StorageError::Backend("legacy token cache is not bound".to_owned()).into(),
            ),
        }
    }
}
