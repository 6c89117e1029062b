use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::UserId;

static DEFAULT_API_URL: &str = "https://mate.academy/students-api";
static CONFIG_FILE_NAME: &str = "config.json";
static ENV_API_URL: &str = "TODOS_API_URL";
static ENV_USER_ID: &str = "TODOS_USER_ID";
static ENV_CONFIG_DIR: &str = "TODOS_CONFIG_DIR";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "todos", "todos"));

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub user_id: Option<String>,
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConfig {
    api_url: Option<String>,
    user_id: Option<UserId>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    api_url: String,
    user_id: Option<UserId>,
    timeout: Duration,
    config_file: PathBuf,
    log_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from overrides, the process environment, the config
    /// file and built-in defaults, in that order.
    pub fn discover(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve(overrides, |key| env::var(key).ok())
    }

    /// Same as [`AppConfig::discover`] with an injectable environment lookup.
    pub fn resolve<F>(overrides: ConfigOverrides, env_lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = overrides
            .config_dir
            .or_else(|| env_lookup(ENV_CONFIG_DIR).map(PathBuf::from))
            .unwrap_or_else(default_config_dir);
        let config_file = config_dir.join(CONFIG_FILE_NAME);
        let file = load_file_config(&config_file)?;

        let api_url = overrides
            .api_url
            .or_else(|| env_lookup(ENV_API_URL))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = normalize_api_url(&api_url)?;

        // Blank or zero at one level falls through to the next.
        let user_id = match parse_user_id(overrides.user_id.as_deref())? {
            Some(id) => Some(id),
            None => parse_user_id(env_lookup(ENV_USER_ID).as_deref())?,
        }
        .or(file.user_id.filter(|id| *id != 0));

        let timeout = file
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            api_url,
            user_id,
            timeout,
            config_file,
            log_dir: default_log_dir(),
        })
    }

    /// Construct [`AppConfig`] directly, bypassing discovery.
    pub fn new(api_url: &str, user_id: Option<UserId>) -> Result<Self> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            user_id: user_id.filter(|id| *id != 0),
            timeout: DEFAULT_TIMEOUT,
            config_file: default_config_dir().join(CONFIG_FILE_NAME),
            log_dir: default_log_dir(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// The session user id, or an error describing how to configure one.
    pub fn require_user_id(&self) -> Result<UserId, ConfigError> {
        self.user_id.ok_or_else(|| ConfigError::MissingUserId {
            config_file: self.config_file.display().to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|err| ConfigError::File {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| ConfigError::File {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_string()))
    }
}

// Zero is treated as "not configured".
fn parse_user_id(raw: Option<&str>) -> Result<Option<UserId>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let id: UserId = trimmed
        .parse()
        .map_err(|_| ConfigError::InvalidUserId(raw.to_string()))?;
    Ok(Some(id).filter(|id| *id != 0))
}

fn default_config_dir() -> PathBuf {
    if let Some(project) = &*PROJECT_DIRS {
        return project.config_dir().to_path_buf();
    }
    env::temp_dir().join("todos")
}

fn default_log_dir() -> PathBuf {
    if let Some(project) = &*PROJECT_DIRS {
        return project.data_dir().to_path_buf();
    }
    env::temp_dir().join("todos")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) {
        fs::write(dir.path().join(CONFIG_FILE_NAME), body).unwrap();
    }

    fn overrides_in(dir: &TempDir) -> ConfigOverrides {
        ConfigOverrides {
            config_dir: Some(dir.path().to_path_buf()),
            ..ConfigOverrides::default()
        }
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(overrides_in(&dir), env_of(&[])).unwrap();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.user_id(), None);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert!(config.require_user_id().is_err());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"{"apiUrl": "https://file.example/api", "userId": 11, "timeoutSecs": 3}"#,
        );

        let from_file = AppConfig::resolve(overrides_in(&dir), env_of(&[])).unwrap();
        assert_eq!(from_file.api_url(), "https://file.example/api");
        assert_eq!(from_file.user_id(), Some(11));
        assert_eq!(from_file.timeout(), Duration::from_secs(3));

        let env = [
            (ENV_API_URL, "https://env.example/api/"),
            (ENV_USER_ID, "22"),
        ];
        let from_env = AppConfig::resolve(overrides_in(&dir), env_of(&env)).unwrap();
        assert_eq!(from_env.api_url(), "https://env.example/api");
        assert_eq!(from_env.user_id(), Some(22));

        let mut overrides = overrides_in(&dir);
        overrides.api_url = Some("http://localhost:8080".into());
        overrides.user_id = Some("33".into());
        let from_cli = AppConfig::resolve(overrides, env_of(&env)).unwrap();
        assert_eq!(from_cli.api_url(), "http://localhost:8080");
        assert_eq!(from_cli.user_id(), Some(33));
    }

    #[test]
    fn zero_user_id_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::resolve(overrides_in(&dir), env_of(&[(ENV_USER_ID, "0")])).unwrap();
        assert_eq!(config.user_id(), None);
    }

    #[test]
    fn blank_or_zero_overrides_fall_back_to_the_file() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{"userId": 11}"#);

        let from_env = AppConfig::resolve(overrides_in(&dir), env_of(&[(ENV_USER_ID, "0")])).unwrap();
        assert_eq!(from_env.user_id(), Some(11));

        let mut overrides = overrides_in(&dir);
        overrides.user_id = Some("  ".into());
        let from_cli = AppConfig::resolve(overrides, env_of(&[(ENV_USER_ID, "22")])).unwrap();
        assert_eq!(from_cli.user_id(), Some(22));
    }

    #[test]
    fn non_numeric_user_id_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = AppConfig::resolve(overrides_in(&dir), env_of(&[(ENV_USER_ID, "alice")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid user id"));
    }

    #[test]
    fn malformed_config_file_is_reported() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "{ not json");
        let err = AppConfig::resolve(overrides_in(&dir), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn config_dir_can_come_from_env() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, r#"{"userId": 5}"#);
        let dir_str = dir.path().display().to_string();
        let config = AppConfig::resolve(
            ConfigOverrides::default(),
            env_of(&[(ENV_CONFIG_DIR, dir_str.as_str())]),
        )
        .unwrap();
        assert_eq!(config.user_id(), Some(5));
        assert_eq!(config.config_file(), dir.path().join(CONFIG_FILE_NAME));
    }

    #[test]
    fn rejects_non_http_api_url() {
        assert!(AppConfig::new("ftp://example.com", Some(1)).is_err());
        let config = AppConfig::new("https://example.com/api/", Some(1)).unwrap();
        assert_eq!(config.api_url(), "https://example.com/api");
    }
}
