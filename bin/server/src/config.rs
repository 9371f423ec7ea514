//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables, with `__` as the nesting separator. The backend
//! section deserializes directly into
//! [`BackendConfig`](quizpress_backend::BackendConfig).

use quizpress_backend::BackendConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory of static assets served at the root.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Hosted backend connection settings.
    pub backend: BackendConfig,

    /// Roster configuration.
    #[serde(default)]
    pub roster: RosterConfig,
}

/// Roster-related configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    /// Email of the protected super admin. That record can never be removed
    /// through the roster endpoints.
    pub protected_email: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
