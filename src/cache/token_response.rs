use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::warn;

use crate::cache::id_token::{IdToken, IdTokenError};
use crate::cache::scopes::split_scopes;
use crate::helpers::time::expires_on_from;

#[derive(Debug, Error)]
pub enum TokenResponseError {
    #[error("token response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token response carries a malformed id token: {0}")]
    IdToken(#[from] IdTokenError),
}

/// `uid`/`utid` pair sent by the token endpoint as base64url JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub uid: String,
    pub utid: String,
}

impl ClientInfo {
    pub fn from_raw(raw: &str) -> Option<Self> {
        let decoded = URL_SAFE_NO_PAD
            .decode(raw.trim().trim_end_matches('='))
            .inspect_err(|e| warn!("client_info is not base64url: {}", e))
            .ok()?;
        serde_json::from_slice(&decoded)
            .inspect_err(|e| warn!("client_info is not a JSON object: {}", e))
            .ok()
    }
}

/// Wire shape of a successful token endpoint reply.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    id_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    expires_in: Option<i64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    ext_expires_in: Option<i64>,
    scope: Option<String>,
    client_info: Option<String>,
    foci: Option<String>,
}

/// Some endpoints send lifetimes as strings.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<Seconds>::deserialize(deserializer)? {
        Some(Seconds::Number(n)) => Some(n),
        Some(Seconds::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// A token endpoint response, as consumed by the write path.
#[derive(Clone, Default)]
pub struct TokenResponse {
    pub id_token: IdToken,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_on: i64,
    pub extended_expires_on: i64,
    pub granted_scopes: Vec<String>,
    pub uid: String,
    pub utid: String,
    pub raw_client_info: String,
    /// Family of client ids the refresh token belongs to, empty when none.
    pub family_id: String,
}

impl TokenResponse {
    /// Parse a token endpoint JSON body; relative lifetimes are anchored at `now`.
    pub fn from_json(body: &str, now: i64) -> Result<Self, TokenResponseError> {
        let raw: RawTokenResponse = serde_json::from_str(body)?;
        let id_token = IdToken::parse(raw.id_token.as_deref().unwrap_or_default())?;

        let expires_in = raw.expires_in.unwrap_or_default();
        let ext_expires_in = raw.ext_expires_in.unwrap_or(expires_in);

        let raw_client_info = raw.client_info.unwrap_or_default();
        let client_info = if raw_client_info.trim().is_empty() {
            ClientInfo::default()
        } else {
            ClientInfo::from_raw(&raw_client_info).unwrap_or_default()
        };

        Ok(Self {
            id_token,
            access_token: raw.access_token.filter(|t| !t.trim().is_empty()),
            refresh_token: raw.refresh_token.filter(|t| !t.trim().is_empty()),
            expires_on: expires_on_from(now, expires_in),
            extended_expires_on: expires_on_from(now, ext_expires_in),
            granted_scopes: split_scopes(raw.scope.as_deref().unwrap_or_default()),
            uid: client_info.uid,
            utid: client_info.utid,
            raw_client_info,
            family_id: raw.foci.unwrap_or_default(),
        })
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("id_token", &self.id_token)
            .field("has_access_token", &self.has_access_token())
            .field("has_refresh_token", &self.has_refresh_token())
            .field("expires_on", &self.expires_on)
            .field("extended_expires_on", &self.extended_expires_on)
            .field("granted_scopes", &self.granted_scopes)
            .field("uid", &self.uid)
            .field("utid", &self.utid)
            .field("family_id", &self.family_id)
            .finish()
    }
}
