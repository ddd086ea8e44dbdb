use serde::{Deserialize, Serialize};

use crate::cache::id_token::IdToken;
use crate::utils::constants::ADFS_PATH_SEGMENT;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityType {
    #[default]
    MsSts,
    Adfs,
}

impl AuthorityType {
    /// Classify an authority by its URL path.
    ///
    /// The path is split on `/`; a leading slash makes index 1 the first real
    /// segment. Only an `adfs` segment there (any case) selects [`AuthorityType::Adfs`].
    pub fn from_path(path: &str) -> Self {
        match path.split('/').nth(1) {
            Some(segment) if segment.eq_ignore_ascii_case(ADFS_PATH_SEGMENT) => AuthorityType::Adfs,
            _ => AuthorityType::MsSts,
        }
    }
}

/// Profile record keyed by (home account id, environment, realm).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub home_account_id: String,
    pub environment: String,
    pub realm: String,
    pub local_account_id: String,
    pub authority_type: AuthorityType,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alternative_account_id: String,
    #[serde(default)]
    pub client_info: String,
}

impl Account {
    /// Full account record derived from an id token's claims.
    pub fn from_id_token(
        home_account_id: &str,
        environment: &str,
        realm: &str,
        authority_type: AuthorityType,
        id_token: &IdToken,
        client_info: &str,
    ) -> Self {
        Self {
            home_account_id: home_account_id.to_owned(),
            environment: environment.to_owned(),
            realm: realm.to_owned(),
            local_account_id: id_token.local_account_id().to_owned(),
            authority_type,
            username: id_token.preferred_username().to_owned(),
            given_name: id_token.given_name().to_owned(),
            family_name: id_token.family_name().to_owned(),
            middle_name: id_token.middle_name().to_owned(),
            name: id_token.name().to_owned(),
            alternative_account_id: id_token.alternative_id().to_owned(),
            client_info: client_info.to_owned(),
        }
    }

    pub fn matches(&self, home_account_id: &str, environment: &str, realm: &str) -> bool {
        self.home_account_id == home_account_id
            && self.environment == environment
            && self.realm == realm
    }

    pub fn same_slot(&self, other: &Account) -> bool {
        self.matches(&other.home_account_id, &other.environment, &other.realm)
    }
}
