//! Cache read/write protocol on top of the [`StorageManager`].
//!
//! Nothing here returns an error: missing key material, storage failures and
//! stale entries all degrade to "no result". Inconsistencies (duplicate
//! records, missing id token or account) are logged and tolerated.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::cache::id_token::IdToken;
use crate::cache::scopes::join_scopes;
use crate::cache::token_response::TokenResponse;
use crate::cache::validity::{is_access_token_valid, is_access_token_valid_at};
use crate::helpers::time::now_i64;
use crate::request::auth_parameters::AuthParameters;
use crate::storage::manager::StorageManager;
use crate::storage::status::OperationStatus;

/// Tokens served from the cache.
#[derive(Debug, Clone, Default)]
pub struct CachedTokens {
    pub id_token: Option<IdToken>,
    pub access_token: Option<Credential>,
    pub refresh_token: Option<Credential>,
}

impl CachedTokens {
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn access_token_secret(&self) -> Option<&str> {
        self.access_token.as_ref().map(|c| c.secret.as_str())
    }

    pub fn refresh_token_secret(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(|c| c.secret.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CacheReadResult {
    pub tokens: CachedTokens,
    pub account: Option<Account>,
}

/// Credentials of a read, at most one per type.
#[derive(Debug, Default)]
pub struct PartitionedCredentials {
    pub access_token: Option<Credential>,
    pub refresh_token: Option<Credential>,
    pub id_token: Option<Credential>,
    pub duplicates: usize,
}

/// Split credentials by type; when a type repeats, the last one observed wins.
pub fn partition_credentials(credentials: Vec<Credential>) -> PartitionedCredentials {
    let mut partitioned = PartitionedCredentials::default();
    for credential in credentials {
        let credential_type = credential.credential_type;
        let slot = match credential_type {
            CredentialType::AccessToken => &mut partitioned.access_token,
            CredentialType::RefreshToken => &mut partitioned.refresh_token,
            CredentialType::IdToken => &mut partitioned.id_token,
        };
        if slot.replace(credential).is_some() {
            warn!("more than one {} read from cache, keeping the last one", credential_type);
            partitioned.duplicates += 1;
        }
    }
    partitioned
}

/// Home account id: `uid.utid` from client info, else the id token's upn, email, subject.
pub fn home_account_id_for(response: &TokenResponse) -> String {
    if !response.uid.trim().is_empty() && !response.utid.trim().is_empty() {
        return format!("{}.{}", response.uid, response.utid);
    }
    response.id_token.home_account_id().to_owned()
}

fn read_types() -> HashSet<CredentialType> {
    HashSet::from([
        CredentialType::AccessToken,
        CredentialType::RefreshToken,
        CredentialType::IdToken,
    ])
}

pub struct CacheManager<'a> {
    storage_manager: &'a StorageManager,
    auth_parameters: &'a AuthParameters,
}

impl<'a> CacheManager<'a> {
    pub fn new(storage_manager: &'a StorageManager, auth_parameters: &'a AuthParameters) -> Self {
        Self {
            storage_manager,
            auth_parameters,
        }
    }

    /// Serve a valid access token or, failing that, a refresh token.
    ///
    /// A valid access token suppresses the refresh token. An invalid access
    /// token is deleted from storage. The account is resolved only alongside
    /// an access token and its absence is not a failure.
    pub fn try_read_cache(&self) -> Option<CacheReadResult> {
        let mut key = self.auth_parameters.credential_key();
        if let Some(missing) = key.missing_component() {
            debug!("cache read skipped: '{}' is empty", missing);
            return None;
        }
        key.family_id = self.family_id(&key.environment, &key.client_id);

        let credentials = match self.storage_manager.read_credentials(&key, &read_types()) {
            OperationStatus::Success(credentials) => credentials,
            OperationStatus::Failure(failure) => {
                warn!("cache read failed: {}", failure.description);
                return None;
            }
        };
        if credentials.is_empty() {
            debug!("no credentials found in cache");
            return None;
        }
        if credentials.len() > 3 {
            warn!("expected up to 3 credentials from cache, read {}", credentials.len());
        }

        let PartitionedCredentials {
            access_token,
            refresh_token,
            id_token,
            ..
        } = partition_credentials(credentials);

        if id_token.is_none() {
            warn!("no id token found in cache");
        }

        let access_token = match access_token {
            Some(at) if is_access_token_valid(&at) => Some(at),
            Some(_) => {
                info!("cached access token is expired or future-dated, removing it");
                self.delete_cached_access_token(&key);
                None
            }
            None => {
                debug!("no access token found in cache");
                None
            }
        };

        let refresh_token = if access_token.is_some() {
            None
        } else if refresh_token.is_none() {
            debug!("no valid access token and no refresh token in cache");
            return None;
        } else {
            refresh_token
        };

        let id_token = id_token.and_then(|credential| match IdToken::parse(&credential.secret) {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!("cached id token is unreadable: {}", e);
                None
            }
        });

        let account = if access_token.is_some() {
            self.read_account(&key)
        } else {
            None
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

    /// Persist a token endpoint response and derive its account.
    ///
    /// Nothing is written when any key component is empty. Storage failures
    /// are logged and do not prevent the account from being returned.
    pub fn cache_token_response(&self, response: &TokenResponse) -> Option<Account> {
        let environment = self.auth_parameters.environment();
        let realm = self.auth_parameters.realm();
        let client_id = self.auth_parameters.client_id.as_str();
        let key = CredentialKey::new(
            home_account_id_for(response),
            environment,
            realm,
            client_id,
            join_scopes(&response.granted_scopes),
        );
        if let Some(missing) = key.missing_component() {
            warn!("skipping cache write: '{}' is empty", missing);
            return None;
        }

        let cached_at = now_i64();
        let mut credentials = Vec::with_capacity(3);

        if let Some(secret) = response.refresh_token.as_deref().filter(|_| response.has_refresh_token()) {
            let rt_key = key.clone().with_family_id(response.family_id.as_str());
            credentials.push(Credential::refresh_token(rt_key, secret, cached_at));
        }

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
            } else {
                info!("not caching an access token that is already expired");
            }
        }

        let id_token = &response.id_token;
        if !id_token.is_empty() {
            credentials.push(Credential::id_token(key.clone(), id_token.raw(), cached_at));
        }

        if !credentials.is_empty() {
            if let OperationStatus::Failure(failure) = self.storage_manager.write_credentials(&credentials) {
                warn!("writing credentials to cache failed: {}", failure.description);
            }
        }

        let app_metadata = AppMetadata::new(environment, client_id, response.family_id.as_str());
        if let OperationStatus::Failure(failure) = self.storage_manager.write_app_metadata(&app_metadata) {
            warn!("writing app metadata to cache failed: {}", failure.description);
        }

        if id_token.is_empty() {
            debug!("token response has no id token, no account derived");
            return None;
        }

        let account = Account::from_id_token(
            &key.home_account_id,
            &key.environment,
            &key.realm,
            self.auth_parameters.authority.authority_type(),
            id_token,
            &response.raw_client_info,
        );

        if let OperationStatus::Failure(failure) = self.storage_manager.write_account(&account) {
            warn!("writing account to cache failed: {}", failure.description);
        }

        Some(account)
    }

    /// Remove the refresh token of the request's account and client.
    pub fn delete_cached_refresh_token(&self) {
        let key = CredentialKey::new(
            self.auth_parameters.account_id.as_str(),
            self.auth_parameters.environment(),
            "",
            self.auth_parameters.client_id.as_str(),
            "",
        );
        if key.home_account_id.trim().is_empty()
            || key.environment.trim().is_empty()
            || key.client_id.trim().is_empty()
        {
            warn!("cannot delete refresh token from cache: key is incomplete");
            return;
        }

        let types = HashSet::from([CredentialType::RefreshToken]);
        if let OperationStatus::Failure(failure) = self.storage_manager.delete_credentials(&key, &types) {
            warn!("deleting refresh token from cache failed: {}", failure.description);
        }
    }

    fn delete_cached_access_token(&self, key: &CredentialKey) {
        let key = CredentialKey {
            family_id: String::new(),
            ..key.clone()
        };
        let types = HashSet::from([CredentialType::AccessToken]);
        if let OperationStatus::Failure(failure) = self.storage_manager.delete_credentials(&key, &types) {
            warn!("deleting access token from cache failed: {}", failure.description);
        }
    }

    fn read_account(&self, key: &CredentialKey) -> Option<Account> {
        let account = match self.storage_manager.read_account(
            &key.home_account_id,
            &key.environment,
            &key.realm,
        ) {
            OperationStatus::Success(account) => account,
            OperationStatus::Failure(failure) => {
                warn!("reading account from cache failed: {}", failure.description);
                None
            }
        };
        if account.is_none() {
            warn!("no account in cache, returning tokens without it");
        }
        account
    }

    /// Family the request's client belongs to, empty when unknown.
    fn family_id(&self, environment: &str, client_id: &str) -> String {
        match self.storage_manager.read_app_metadata(environment, client_id) {
            OperationStatus::Success(Some(app_metadata)) => app_metadata.family_id,
            OperationStatus::Success(None) => String::new(),
            OperationStatus::Failure(failure) => {
                debug!("app metadata unavailable: {}", failure.description);
                String::new()
            }
        }
    }
}
