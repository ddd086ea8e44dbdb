//! Parsed OIDC id token.
//!
//! Claims are decoded from the JWT payload without signature validation and
//! only feed cache identities. All claim precedence rules live here.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdTokenError {
    #[error("id token must have three dot separated segments, got {0}")]
    Segments(usize),
    #[error("id token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("id token payload is not a JSON claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Mapped claims. A claim that is missing, null or not a string reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdTokenClaims {
    #[serde(deserialize_with = "lenient_claim")]
    pub sub: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub oid: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub iss: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub tid: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub preferred_username: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub email: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub upn: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub name: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub given_name: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub family_name: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub middle_name: String,
    #[serde(deserialize_with = "lenient_claim")]
    pub altsecid: String,
}

fn lenient_claim<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdToken {
    raw: String,
    claims: IdTokenClaims,
}

impl IdToken {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a compact JWT. An empty or blank string yields an empty token.
    pub fn parse(raw: &str) -> Result<Self, IdTokenError> {
        if raw.trim().is_empty() {
            return Ok(Self::empty());
        }

        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() != 3 {
            return Err(IdTokenError::Segments(segments.len()));
        }

        let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
        let claims: IdTokenClaims = serde_json::from_slice(&payload)?;
        Ok(Self {
            raw: raw.to_owned(),
            claims,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn object_id(&self) -> &str {
        &self.claims.oid
    }

    pub fn preferred_username(&self) -> &str {
        &self.claims.preferred_username
    }

    pub fn upn(&self) -> &str {
        &self.claims.upn
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn name(&self) -> &str {
        &self.claims.name
    }

    pub fn given_name(&self) -> &str {
        &self.claims.given_name
    }

    pub fn family_name(&self) -> &str {
        &self.claims.family_name
    }

    pub fn middle_name(&self) -> &str {
        &self.claims.middle_name
    }

    pub fn alternative_id(&self) -> &str {
        &self.claims.altsecid
    }

    /// Local account id: object id, else subject.
    pub fn local_account_id(&self) -> &str {
        first_present(&[self.claims.oid.as_str(), self.claims.sub.as_str()])
    }

    /// Home account id when the response carries no client info: upn, else email, else subject.
    pub fn home_account_id(&self) -> &str {
        first_present(&[
            self.claims.upn.as_str(),
            self.claims.email.as_str(),
            self.claims.sub.as_str(),
        ])
    }
}

/// First non-blank candidate; the last one is returned as-is when all are blank.
fn first_present<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|value| !value.trim().is_empty())
        .or_else(|| candidates.last().copied())
        .unwrap_or_default()
}

impl fmt::Debug for IdToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdToken")
            .field("empty", &self.is_empty())
            .field("claims", &self.claims)
            .finish()
    }
}
