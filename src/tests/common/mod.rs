// src/tests/common/mod.rs
//! Test doubles and fixtures shared by the scenario tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::account::Account;
use crate::cache::app_metadata::AppMetadata;
use crate::cache::credential::{Credential, CredentialKey, CredentialType};
use crate::cache::id_token::IdToken;
use crate::cache::token_response::TokenResponse;
use crate::helpers::time::now_i64;
use crate::request::auth_parameters::AuthParameters;
use crate::request::authority::Authority;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::legacy::{LegacyCacheBridge, LegacyCacheKey};
use crate::storage::memory::InMemoryStorageWorker;
use crate::storage::worker::StorageWorker;

pub const AUTHORITY: &str = "https://login.example.com/contoso.com";
pub const ENVIRONMENT: &str = "login.example.com";
pub const REALM: &str = "contoso.com";
pub const CLIENT_ID: &str = "client-id";
pub const HOME_ACCOUNT_ID: &str = "uid.utid";

/// Unsigned compact JWT carrying `claims` as payload.
pub fn jwt(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

pub fn id_token(claims: Value) -> IdToken {
    IdToken::parse(&jwt(claims)).unwrap()
}

pub fn client_info(uid: &str, utid: &str) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::json!({"uid": uid, "utid": utid}).to_string())
}

pub fn auth_params(account_id: &str, scopes: &[&str]) -> AuthParameters {
    auth_params_with_authority(account_id, AUTHORITY, scopes)
}

pub fn auth_params_with_authority(account_id: &str, authority: &str, scopes: &[&str]) -> AuthParameters {
    AuthParameters::new(
        account_id,
        Authority::parse(authority).unwrap(),
        CLIENT_ID,
        scopes.iter().map(|s| s.to_string()).collect(),
    )
}

/// Full response for `uid.utid` with an hour-long access token.
pub fn token_response(scopes: &[&str]) -> TokenResponse {
    let now = now_i64();
    TokenResponse {
        id_token: id_token(serde_json::json!({
            "sub": "subject",
            "oid": "object-id",
            "tid": "utid",
            "preferred_username": "user@contoso.com",
            "name": "Test User",
            "given_name": "Test",
            "family_name": "User",
        })),
        access_token: Some("the_secret".to_owned()),
        refresh_token: Some("the_refresh_token".to_owned()),
        expires_on: now + 3600,
        extended_expires_on: now + 7200,
        granted_scopes: scopes.iter().map(|s| s.to_string()).collect(),
        uid: "uid".to_owned(),
        utid: "utid".to_owned(),
        raw_client_info: client_info("uid", "utid"),
        family_id: String::new(),
    }
}

pub fn key(scopes: &str) -> CredentialKey {
    CredentialKey::new(HOME_ACCOUNT_ID, ENVIRONMENT, REALM, CLIENT_ID, scopes)
}

pub fn fresh_access_token(scopes: &str, secret: &str) -> Credential {
    let now = now_i64();
    Credential::access_token(key(scopes), secret, now, now + 3600, now + 3600)
}

/// In-memory worker that counts and names every call it receives.
#[derive(Default)]
pub struct RecordingWorker {
    pub inner: InMemoryStorageWorker,
    calls: AtomicUsize,
    log: Mutex<Vec<&'static str>>,
}

impl RecordingWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> Vec<&'static str> {
        self.log.lock().clone()
    }

    fn record(&self, op: &'static str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(op);
    }
}

impl StorageWorker for RecordingWorker {
    fn read_credentials(&self, key: &CredentialKey, types: &HashSet<CredentialType>) -> StorageResult<Vec<Credential>> {
        self.record("read_credentials");
        self.inner.read_credentials(key, types)
    }

    fn write_credentials(&self, credentials: &[Credential]) -> StorageResult<()> {
        self.record("write_credentials");
        self.inner.write_credentials(credentials)
    }

    fn delete_credentials(&self, key: &CredentialKey, types: &HashSet<CredentialType>) -> StorageResult<()> {
        self.record("delete_credentials");
        self.inner.delete_credentials(key, types)
    }

    fn read_account(&self, home_account_id: &str, environment: &str, realm: &str) -> StorageResult<Option<Account>> {
        self.record("read_account");
        self.inner.read_account(home_account_id, environment, realm)
    }

    fn write_account(&self, account: &Account) -> StorageResult<()> {
        self.record("write_account");
        self.inner.write_account(account)
    }

    fn delete_account(&self, home_account_id: &str, environment: &str, realm: &str) -> StorageResult<()> {
        self.record("delete_account");
        self.inner.delete_account(home_account_id, environment, realm)
    }

    fn delete_accounts(&self, home_account_id: &str, environment: &str) -> StorageResult<()> {
        self.record("delete_accounts");
        self.inner.delete_accounts(home_account_id, environment)
    }

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>> {
        self.record("read_all_accounts");
        self.inner.read_all_accounts()
    }

    fn read_app_metadata(&self, environment: &str, client_id: &str) -> StorageResult<Option<AppMetadata>> {
        self.record("read_app_metadata");
        self.inner.read_app_metadata(environment, client_id)
    }

    fn write_app_metadata(&self, app_metadata: &AppMetadata) -> StorageResult<()> {
        self.record("write_app_metadata");
        self.inner.write_app_metadata(app_metadata)
    }
}

/// Worker whose every call faults.
pub struct FailingWorker;

fn fault<T>() -> StorageResult<T> {
    Err(StorageError::Backend("disk unavailable".to_owned()))
}

impl StorageWorker for FailingWorker {
    fn read_credentials(&self, _: &CredentialKey, _: &HashSet<CredentialType>) -> StorageResult<Vec<Credential>> {
        fault()
    }

    fn write_credentials(&self, _: &[Credential]) -> StorageResult<()> {
        fault()
    }

    fn delete_credentials(&self, _: &CredentialKey, _: &HashSet<CredentialType>) -> StorageResult<()> {
        fault()
    }

    fn read_account(&self, _: &str, _: &str, _: &str) -> StorageResult<Option<Account>> {
        fault()
    }

    fn write_account(&self, _: &Account) -> StorageResult<()> {
        fault()
    }

    fn delete_account(&self, _: &str, _: &str, _: &str) -> StorageResult<()> {
        fault()
    }

    fn delete_accounts(&self, _: &str, _: &str) -> StorageResult<()> {
        fault()
    }

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>> {
        fault()
    }

    fn read_app_metadata(&self, _: &str, _: &str) -> StorageResult<Option<AppMetadata>> {
        fault()
    }

    fn write_app_metadata(&self, _: &AppMetadata) -> StorageResult<()> {
        fault()
    }
}

/// Worker that answers every credential read with a fixed list, duplicates included.
pub struct DuplicateWorker {
    pub credentials: Vec<Credential>,
    pub deleted: Mutex<Vec<CredentialKey>>,
}

impl DuplicateWorker {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self {
            credentials,
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl StorageWorker for DuplicateWorker {
    fn read_credentials(&self, _: &CredentialKey, types: &HashSet<CredentialType>) -> StorageResult<Vec<Credential>> {
        Ok(self
            .credentials
            .iter()
            .filter(|c| types.contains(&c.credential_type))
            .cloned()
            .collect())
    }

    fn write_credentials(&self, _: &[Credential]) -> StorageResult<()> {
        Ok(())
    }

    fn delete_credentials(&self, key: &CredentialKey, _: &HashSet<CredentialType>) -> StorageResult<()> {
        self.deleted.lock().push(key.clone());
        Ok(())
    }

    fn read_account(&self, _: &str, _: &str, _: &str) -> StorageResult<Option<Account>> {
        Ok(None)
    }

    fn write_account(&self, _: &Account) -> StorageResult<()> {
        Ok(())
    }

    fn delete_account(&self, _: &str, _: &str, _: &str) -> StorageResult<()> {
        Ok(())
    }

    fn delete_accounts(&self, _: &str, _: &str) -> StorageResult<()> {
        Ok(())
    }

    fn read_all_accounts(&self) -> StorageResult<Vec<Account>> {
        Ok(Vec::new())
    }

    fn read_app_metadata(&self, _: &str, _: &str) -> StorageResult<Option<AppMetadata>> {
        Ok(None)
    }

    fn write_app_metadata(&self, _: &AppMetadata) -> StorageResult<()> {
        Ok(())
    }
}

/// Legacy cache held in memory; `failing` makes every call fault.
#[derive(Default)]
pub struct InMemoryLegacyBridge {
    pub refresh_tokens: Mutex<HashMap<LegacyCacheKey, String>>,
    pub users: Mutex<Vec<Account>>,
    pub removed: Mutex<Vec<LegacyCacheKey>>,
    pub failing: bool,
}

impl InMemoryLegacyBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_refresh_token(self, key: LegacyCacheKey, secret: &str) -> Self {
        self.refresh_tokens.lock().insert(key, secret.to_owned());
        self
    }

    pub fn with_user(self, account: Account) -> Self {
        self.users.lock().push(account);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl LegacyCacheBridge for InMemoryLegacyBridge {
    fn get_legacy_refresh_token(&self, key: &LegacyCacheKey) -> StorageResult<Option<String>> {
        if self.failing {
            return Err(StorageError::Backend("legacy cache corrupted".to_owned()));
        }
        Ok(self.refresh_tokens.lock().get(key).cloned())
    }

    fn remove_legacy_user(&self, key: &LegacyCacheKey) -> StorageResult<()> {
        if self.failing {
            return Err(StorageError::Backend("legacy cache corrupted".to_owned()));
        }
        self.removed.lock().push(key.clone());
        self.users
            .lock()
            .retain(|a| !(a.home_account_id == key.home_account_id && a.environment == key.environment));
        Ok(())
    }

    fn get_all_legacy_users(&self) -> StorageResult<Vec<Account>> {
        if self.failing {
            return Err(StorageError::Backend("legacy cache corrupted".to_owned()));
        }
        Ok(self.users.lock().clone())
    }

    fn write_legacy_refresh_token(&self, key: &LegacyCacheKey, secret: &str) -> StorageResult<()> {
        if self.failing {
            return Err(StorageError::Backend("legacy cache corrupted".to_owned()));
        }
        self.refresh_tokens.lock().insert(key.clone(), secret.to_owned());
        Ok(())
    }
}
