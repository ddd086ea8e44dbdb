use std::fmt;

use thiserror::Error;
use url::Url;

use crate::cache::account::AuthorityType;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("authority '{authority}' is not a valid URL: {source}")]
    InvalidUrl {
        authority: String,
        #[source]
        source: url::ParseError,
    },
}

/// Token issuer URL, e.g. `https://login.example.com/contoso.onmicrosoft.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    url: Url,
}

impl Authority {
    pub fn parse(authority: &str) -> Result<Self, AuthorityError> {
        let url = Url::parse(authority.trim()).map_err(|source| AuthorityError::InvalidUrl {
            authority: authority.to_owned(),
            source,
        })?;
        Ok(Self { url })
    }

    /// Host of the issuing endpoint; empty for host-less URLs.
    pub fn environment(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// First path segment (tenant / directory); empty when the path is `/`.
    pub fn realm(&self) -> &str {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn authority_type(&self) -> AuthorityType {
        AuthorityType::from_path(self.path())
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
