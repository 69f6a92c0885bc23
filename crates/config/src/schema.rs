/// Config schema types (server, auth, database).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 5001.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 5001,
        }
    }
}

/// Request authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Skip token checks entirely and serve every request as `anonymous_uid`.
    /// Only meant for local development.
    pub disabled: bool,
    pub anonymous_uid: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            anonymous_uid: "anonymous".into(),
        }
    }
}

/// SQLite database location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit database file. When unset, `parley.db` inside the data dir is used.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolve_path(&self, data_dir: &std::path::Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| data_dir.join("parley.db"))
    }
}
