use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub blob: BlobConfig,

    /// Directory holding the timestamped `.up.sql` / `.down.sql` scripts.
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,

    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            slack: SlackConfig::default(),
            blob: BlobConfig::default(),
            migrations_dir: default_migrations_dir(),
            log_level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Workspace session token (`xoxc-...`).
    #[serde(default)]
    pub token: Option<String>,

    /// Browser session cookie (`d=` value) paired with the token.
    #[serde(default)]
    pub cookie: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlobConfig {
    /// SeaweedFS master URL, e.g. `http://localhost:9333`.
    #[serde(default)]
    pub master_url: Option<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("slackvault.db")
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}
