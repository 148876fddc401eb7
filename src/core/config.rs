//! Configuration - API endpoint, paging, and the local data directory
//!
//! Settings come from `config.yaml` in the data directory, overridden by
//! environment variables. The data directory is `$CDESK_HOME` when set,
//! otherwise the platform data directory for `clinic-desk`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HOME_ENV: &str = "CDESK_HOME";
pub const API_URL_ENV: &str = "CDESK_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_PER_PAGE: u32 = 15;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

const CONFIG_FILE: &str = "config.yaml";
const SESSION_FILE: &str = "session.json";
const CACHE_FILE: &str = "cache.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine a data directory; set CDESK_HOME")]
    NoHome,

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode configuration: {0}")]
    Encode(#[from] serde_yml::Error),

    #[error("invalid API URL '{0}'")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_url: String,

    /// Page size requested for list screens
    pub per_page: u32,

    /// Seconds a cached response stays fresh (0 = until invalidated)
    pub cache_ttl_secs: u64,

    /// Request timeout; the transport default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Data directory this config was loaded from
    #[serde(skip)]
    home: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: None,
            home: None,
        }
    }
}

impl Config {
    /// Load configuration, falling back to defaults for anything missing
    pub fn load() -> Self {
        let home = Self::default_home();
        let mut config = home
            .as_deref()
            .map(Self::load_from)
            .unwrap_or_default();
        config.home = home;

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }
        config
    }

    /// Load `config.yaml` from a data directory
    pub fn load_from(home: &Path) -> Self {
        let path = home.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => serde_yml::from_str::<Config>(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                Config::default()
            }),
            Err(_) => Config::default(),
        };
        config.home = Some(home.to_path_buf());
        config
    }

    fn default_home() -> Option<PathBuf> {
        if let Ok(home) = std::env::var(HOME_ENV) {
            if !home.trim().is_empty() {
                return Some(PathBuf::from(home));
            }
        }
        ProjectDirs::from("", "", "clinic-desk").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Write the settings back to `config.yaml`
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let home = self.home_dir()?;
        let path = home.join(CONFIG_FILE);
        std::fs::create_dir_all(&home).map_err(|source| ConfigError::Io {
            path: home.clone(),
            source,
        })?;
        let content = serde_yml::to_string(self)?;
        std::fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn home_dir(&self) -> Result<PathBuf, ConfigError> {
        self.home.clone().ok_or(ConfigError::NoHome)
    }

    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.home_dir()?.join(CONFIG_FILE))
    }

    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.home_dir()?.join(SESSION_FILE))
    }

    pub fn cache_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.home_dir()?.join(CACHE_FILE))
    }

    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        match self.cache_ttl_secs {
            0 => None,
            secs => chrono::Duration::try_seconds(secs as i64),
        }
    }

    /// Set the API URL after checking it parses as http(s)
    pub fn set_api_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(raw.trim())
            .map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(raw.to_string()));
        }
        self.api_url = raw.trim().trim_end_matches('/').to_string();
        Ok(())
    }

    /// Public URL of a file stored by the backend
    ///
    /// Files are served from `<origin>/storage/<path>`, where origin is the
    /// API URL without its trailing `/api`. Absolute URLs pass through.
    pub fn storage_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.api_url.trim_end_matches('/');
        let origin = base.strip_suffix("/api").unwrap_or(base);
        format!("{}/storage/{}", origin, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.per_page, 15);
        assert_eq!(config.cache_ttl(), chrono::Duration::try_seconds(300));
    }

    #[test]
    fn test_storage_url() {
        let config = Config {
            api_url: "https://clinic.example.com/api/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.storage_url("clinics/photo.jpg"),
            "https://clinic.example.com/storage/clinics/photo.jpg"
        );
        assert_eq!(
            config.storage_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let mut config = Config::load_from(tmp.path());
        config.per_page = 50;
        config.set_api_url("http://10.0.0.5:8000/api").unwrap();
        config.save().unwrap();

        let loaded = Config::load_from(tmp.path());
        assert_eq!(loaded.per_page, 50);
        assert_eq!(loaded.api_url, "http://10.0.0.5:8000/api");
        assert_eq!(loaded.session_path().unwrap(), tmp.path().join("session.json"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = Config::default();
        assert!(config.set_api_url("ftp://example.com").is_err());
        assert!(config.set_api_url("not a url").is_err());
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_zero_ttl_means_until_invalidated() {
        let config = Config {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.cache_ttl().is_none());
    }
}
