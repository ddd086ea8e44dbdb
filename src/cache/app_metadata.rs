use serde::{Deserialize, Serialize};

/// Per (environment, client id) record remembering the client's family membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub environment: String,
    pub client_id: String,
    #[serde(default)]
    pub family_id: String,
}

impl AppMetadata {
    pub fn new(
        environment: impl Into<String>,
        client_id: impl Into<String>,
        family_id: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            client_id: client_id.into(),
            family_id: family_id.into(),
        }
    }

    pub fn matches(&self, environment: &str, client_id: &str) -> bool {
        self.environment == environment && self.client_id == client_id
    }
}
