//! Hosted backend configuration.

use serde::Deserialize;

/// Connection settings for the hosted identity provider and document store.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project API key, appended to identity-toolkit requests.
    pub api_key: String,

    /// Project identifier used in document paths.
    pub project_id: String,

    /// Base URL of the identity-toolkit API.
    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    /// Base URL of the document-store API.
    #[serde(default = "default_store_url")]
    pub store_url: String,
}

fn default_identity_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_store_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

impl BackendConfig {
    /// Root path of the project's document database.
    #[must_use]
    pub fn database_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }
}
