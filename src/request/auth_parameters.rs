use crate::cache::credential::CredentialKey;
use crate::cache::scopes::join_scopes;
use crate::request::authority::Authority;

/// Request-scoped key material supplied by the caller.
#[derive(Debug, Clone)]
pub struct AuthParameters {
    /// Home account id of the signed-in user.
    pub account_id: String,
    pub authority: Authority,
    pub client_id: String,
    pub requested_scopes: Vec<String>,
}

impl AuthParameters {
    pub fn new(
        account_id: impl Into<String>,
        authority: Authority,
        client_id: impl Into<String>,
        requested_scopes: Vec<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            authority,
            client_id: client_id.into(),
            requested_scopes,
        }
    }

    pub fn environment(&self) -> &str {
        self.authority.environment()
    }

    pub fn realm(&self) -> &str {
        self.authority.realm()
    }

    pub fn target(&self) -> String {
        join_scopes(&self.requested_scopes)
    }

    /// Composite key for a read with these parameters; family id left empty.
    pub fn credential_key(&self) -> CredentialKey {
        CredentialKey::new(
            self.account_id.as_str(),
            self.environment(),
            self.realm(),
            self.client_id.as_str(),
            self.target(),
        )
    }
}
