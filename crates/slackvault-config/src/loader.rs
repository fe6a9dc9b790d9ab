use std::path::{Path, PathBuf};

use slackvault_common::{Error, Result};
use tracing::info;

use crate::model::AppConfig;

pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_dir: Self::default_config_dir(),
        })
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|c| c.join("slackvault"))
            .unwrap_or_else(|| PathBuf::from(".slackvault"))
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load `config.yml` (preferred) or `config.toml`, fall back to
    /// defaults when neither exists, then layer environment overrides.
    pub fn load(&self) -> Result<AppConfig> {
        let yaml_path = self.config_dir.join("config.yml");
        let toml_path = self.config_dir.join("config.toml");

        let mut config = if yaml_path.exists() {
            info!("loading config from {}", yaml_path.display());
            let contents = std::fs::read_to_string(&yaml_path)?;
            serde_yaml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse YAML config: {e}")))?
        } else if toml_path.exists() {
            info!("loading config from {}", toml_path.display());
            let contents = std::fs::read_to_string(&toml_path)?;
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse TOML config: {e}")))?
        } else {
            info!("no config file found, using defaults");
            AppConfig::default()
        };

        apply_env(&mut config);
        Ok(config)
    }
}

/// Secrets and deployment-specific paths come from the environment and
/// win over the config file.
fn apply_env(config: &mut AppConfig) {
    if let Ok(path) = std::env::var("SLACKVAULT_DB") {
        config.database.path = PathBuf::from(path);
    }
    if let Ok(dir) = std::env::var("SLACKVAULT_MIGRATIONS") {
        config.migrations_dir = PathBuf::from(dir);
    }
    if let Ok(token) = std::env::var("SLACK_AUTH_TOKEN") {
        config.slack.token = Some(token);
    }
    if let Ok(cookie) = std::env::var("SLACK_AUTH_COOKIE") {
        config.slack.cookie = Some(cookie);
    }
    if let Ok(url) = std::env::var("SEAWEEDFS_MASTER_URL") {
        config.blob.master_url = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigLoader;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // `load` reads process-wide environment variables, so tests that
    // set them and tests that assert env-overridable values must not
    // interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "slackvault-config-test-{}-{}-{}",
            label,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn load_returns_default_when_no_config_exists() {
        let _guard = ENV_LOCK.lock().expect("env lock should not be poisoned");
        let dir = temp_dir("default");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        let loader = ConfigLoader::with_dir(&dir);
        let config = loader.load().expect("load should succeed");

        assert_eq!(config.database.path, PathBuf::from("slackvault.db"));
        assert_eq!(config.migrations_dir, PathBuf::from("migrations"));
        assert!(config.slack.token.is_none());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_prefers_yaml_over_toml_when_both_exist() {
        let _guard = ENV_LOCK.lock().expect("env lock should not be poisoned");
        let dir = temp_dir("yaml-precedence");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        fs::write(
            dir.join("config.yml"),
            "database:\n  path: \"from-yaml.db\"\n",
        )
        .expect("failed to write yaml config");
        fs::write(
            dir.join("config.toml"),
            "[database]\npath = \"from-toml.db\"\n",
        )
        .expect("failed to write toml config");

        let loader = ConfigLoader::with_dir(&dir);
        let config = loader.load().expect("load should succeed");

        assert_eq!(config.database.path, PathBuf::from("from-yaml.db"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_reads_toml_when_yaml_missing() {
        let _guard = ENV_LOCK.lock().expect("env lock should not be poisoned");
        let dir = temp_dir("toml");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        fs::write(
            dir.join("config.toml"),
            "[blob]\nmaster_url = \"http://localhost:9333\"\n\n[slack]\ntoken = \"xoxc-test\"\n",
        )
        .expect("failed to write toml config");

        let loader = ConfigLoader::with_dir(&dir);
        let config = loader.load().expect("load should succeed");

        assert_eq!(
            config.blob.master_url.as_deref(),
            Some("http://localhost:9333")
        );
        assert_eq!(config.slack.token.as_deref(), Some("xoxc-test"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn environment_overrides_win_over_file_values() {
        let _guard = ENV_LOCK.lock().expect("env lock should not be poisoned");
        let dir = temp_dir("env-overrides");
        fs::create_dir_all(&dir).expect("failed to create temp dir");

        fs::write(
            dir.join("config.toml"),
            "migrations_dir = \"file-migrations\"\n\n\
             [database]\npath = \"from-file.db\"\n\n\
             [slack]\ntoken = \"xoxc-file\"\ncookie = \"d-file\"\n",
        )
        .expect("failed to write toml config");

        unsafe {
            std::env::set_var("SLACKVAULT_DB", "from-env.db");
            std::env::set_var("SLACKVAULT_MIGRATIONS", "env-migrations");
            std::env::set_var("SLACK_AUTH_TOKEN", "xoxc-env");
            std::env::set_var("SLACK_AUTH_COOKIE", "d-env");
            std::env::set_var("SEAWEEDFS_MASTER_URL", "http://env:9333");
        }

        let config = ConfigLoader::with_dir(&dir)
            .load()
            .expect("load should succeed");

        unsafe {
            std::env::remove_var("SLACKVAULT_DB");
            std::env::remove_var("SLACKVAULT_MIGRATIONS");
            std::env::remove_var("SLACK_AUTH_TOKEN");
            std::env::remove_var("SLACK_AUTH_COOKIE");
            std::env::remove_var("SEAWEEDFS_MASTER_URL");
        }

        assert_eq!(config.database.path, PathBuf::from("from-env.db"));
        assert_eq!(config.migrations_dir, PathBuf::from("env-migrations"));
        assert_eq!(config.slack.token.as_deref(), Some("xoxc-env"));
        assert_eq!(config.slack.cookie.as_deref(), Some("d-env"));
        assert_eq!(config.blob.master_url.as_deref(), Some("http://env:9333"));

        let _ = fs::remove_dir_all(dir);
    }
}
