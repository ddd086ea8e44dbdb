use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    AccessToken,
    RefreshToken,
    IdToken,
}

impl CredentialType {
    pub fn as_str(&self) -> &'static str {
        match *self {
            CredentialType::AccessToken => "access_token",
            CredentialType::RefreshToken => "refresh_token",
            CredentialType::IdToken => "id_token",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite cache key: (home account id, environment, realm, client id, family id, target).
///
/// Refresh tokens carry an empty realm and target, id tokens an empty target.
/// Storage does not enforce uniqueness of this tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialKey {
    pub home_account_id: String,
    pub environment: String,
    pub realm: String,
    pub client_id: String,
    #[serde(default)]
    pub family_id: String,
    #[serde(default)]
    pub target: String,
}

impl CredentialKey {
    pub fn new(
        home_account_id: impl Into<String>,
        environment: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            home_account_id: home_account_id.into(),
            environment: environment.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            family_id: String::new(),
            target: target.into(),
        }
    }

    pub fn with_family_id(mut self, family_id: impl Into<String>) -> Self {
        self.family_id = family_id.into();
        self
    }

    /// First of the five required components that is empty or whitespace.
    pub fn missing_component(&self) -> Option<&'static str> {
        [
            ("home_account_id", &self.home_account_id),
            ("environment", &self.environment),
            ("realm", &self.realm),
            ("client_id", &self.client_id),
            ("target", &self.target),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }

    /// Key of the refresh token sharing this key's account and client.
    pub fn for_refresh_token(&self) -> Self {
        Self {
            realm: String::new(),
            target: String::new(),
            ..self.clone()
        }
    }

    /// Key of the id token sharing this key's account, tenant and client.
    pub fn for_id_token(&self) -> Self {
        Self {
            family_id: String::new(),
            target: String::new(),
            ..self.clone()
        }
    }
}

/// A cached secret. Records are replaced as a whole, never patched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(flatten)]
    pub key: CredentialKey,
    pub credential_type: CredentialType,
    pub secret: String,
    pub cached_at: i64,
    #[serde(default)]
    pub expires_on: i64,
    #[serde(default)]
    pub extended_expires_on: i64,
}

impl Credential {
    pub fn access_token(
        key: CredentialKey,
        secret: impl Into<String>,
        cached_at: i64,
        expires_on: i64,
        extended_expires_on: i64,
    ) -> Self {
        Self {
            key: CredentialKey {
                family_id: String::new(),
                ..key
            },
            credential_type: CredentialType::AccessToken,
            secret: secret.into(),
            cached_at,
            expires_on,
            extended_expires_on,
        }
    }

    pub fn refresh_token(key: CredentialKey, secret: impl Into<String>, cached_at: i64) -> Self {
        Self {
            key: key.for_refresh_token(),
            credential_type: CredentialType::RefreshToken,
            secret: secret.into(),
            cached_at,
            expires_on: 0,
            extended_expires_on: 0,
        }
    }

    pub fn id_token(key: CredentialKey, secret: impl Into<String>, cached_at: i64) -> Self {
        Self {
            key: key.for_id_token(),
            credential_type: CredentialType::IdToken,
            secret: secret.into(),
            cached_at,
            expires_on: 0,
            extended_expires_on: 0,
        }
    }

    pub fn home_account_id(&self) -> &str {
        &self.key.home_account_id
    }

    pub fn environment(&self) -> &str {
        &self.key.environment
    }

    pub fn realm(&self) -> &str {
        &self.key.realm
    }

    pub fn client_id(&self) -> &str {
        &self.key.client_id
    }

    pub fn family_id(&self) -> &str {
        &self.key.family_id
    }

    pub fn target(&self) -> &str {
        &self.key.target
    }

    /// Whether this record answers a lookup for `query`.
    ///
    /// Access tokens match on every component except the family id, id tokens
    /// ignore the target, refresh tokens ignore realm and target and also
    /// match through a shared family id.
    pub fn matches(&self, query: &CredentialKey) -> bool {
        let same_account = self.key.home_account_id == query.home_account_id
            && self.key.environment == query.environment;
        if !same_account {
            return false;
        }
        match self.credential_type {
            CredentialType::AccessToken => {
                self.key.realm == query.realm
                    && self.key.client_id == query.client_id
                    && self.key.target == query.target
            }
            CredentialType::IdToken => {
                self.key.realm == query.realm && self.key.client_id == query.client_id
            }
            CredentialType::RefreshToken => {
                self.key.client_id == query.client_id
                    || (!query.family_id.is_empty() && self.key.family_id == query.family_id)
            }
        }
    }

    /// Two records occupy the same slot when type and full key agree.
    pub fn same_slot(&self, other: &Credential) -> bool {
        self.credential_type == other.credential_type && self.key == other.key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("credential_type", &self.credential_type)
            .field("secret", &"[REDACTED]")
            .field("cached_at", &self.cached_at)
            .field("expires_on", &self.expires_on)
            .field("extended_expires_on", &self.extended_expires_on)
            .finish()
    }
}
