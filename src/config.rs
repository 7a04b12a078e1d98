//! Application-level configuration loading: storage backend, admin token and category list.

use std::{env, fmt, fs, io::ErrorKind, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "YOBI_BACK_CONFIG_PATH";
/// Environment variable that overrides the admin token from the file.
const ADMIN_TOKEN_ENV: &str = "YOBI_ADMIN_TOKEN";
/// Environment variable that overrides the storage backend from the file.
const STORAGE_ENV: &str = "YOBI_STORAGE";

/// Persistence backend the server connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Firebase Realtime Database over REST.
    #[default]
    Firebase,
    /// MongoDB collection.
    Mongo,
    /// Process-local map; data is lost on restart.
    Memory,
}

impl StorageBackend {
    /// Short lowercase name used in logs and the health payload.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Firebase => "firebase",
            StorageBackend::Mongo => "mongo",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(StorageBackend::Firebase),
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    storage: StorageBackend,
    admin_token: Option<String>,
    categories: Vec<String>,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        categories = app_config.categories.len(),
                        "loaded configuration file"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_overrides(|name| env::var(name).ok())
    }

    /// Apply `YOBI_STORAGE` / `YOBI_ADMIN_TOKEN` style overrides looked up through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(STORAGE_ENV) {
            match raw.parse::<StorageBackend>() {
                Ok(storage) => self.storage = storage,
                Err(err) => warn!(error = %err, "ignoring {STORAGE_ENV}"),
            }
        }

        if let Some(token) = lookup(ADMIN_TOKEN_ENV) {
            self.admin_token = non_empty(token);
        }

        self
    }

    /// Backend the storage supervisor should connect to.
    pub fn storage(&self) -> StorageBackend {
        self.storage
    }

    /// Token expected in the `X-Admin-Token` header; `None` disables the admin routes.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// Categories offered to the catalog UI.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            admin_token: None,
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    storage: Option<StorageBackend>,
    #[serde(default)]
    admin_token: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let categories = value
            .categories
            .map(|categories| {
                categories
                    .into_iter()
                    .filter_map(|category| non_empty(category.trim().to_owned()))
                    .collect::<Vec<_>>()
            })
            .filter(|categories| !categories.is_empty())
            .unwrap_or_else(default_categories);

        Self {
            storage: value.storage.unwrap_or_default(),
            admin_token: value.admin_token.and_then(non_empty),
            categories,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Categories shipped with the binary.
fn default_categories() -> Vec<String> {
    [
        "Action",
        "Adventure",
        "Puzzle",
        "Racing",
        "Sports",
        "Strategy",
        "Arcade",
        "Shooting",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_firebase_and_builtin_categories() {
        let config = AppConfig::default();
        assert_eq!(config.storage(), StorageBackend::Firebase);
        assert_eq!(config.admin_token(), None);
        assert_eq!(config.categories().len(), 8);
        assert_eq!(config.categories()[0], "Action");
    }

    #[test]
    fn raw_config_overrides_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"storage": "mongo", "admin_token": "s3cret", "categories": ["Idle", " ", "Card"]}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.storage(), StorageBackend::Mongo);
        assert_eq!(config.admin_token(), Some("s3cret"));
        assert_eq!(config.categories(), ["Idle".to_string(), "Card".to_string()]);
    }

    #[test]
    fn empty_category_list_falls_back_to_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"categories": []}"#).unwrap();
        assert_eq!(AppConfig::from(raw).categories().len(), 8);
    }

    #[test]
    fn environment_overrides_win() {
        let config = AppConfig::default().with_overrides(|name| match name {
            "YOBI_STORAGE" => Some("Memory".into()),
            "YOBI_ADMIN_TOKEN" => Some("from-env".into()),
            _ => None,
        });
        assert_eq!(config.storage(), StorageBackend::Memory);
        assert_eq!(config.admin_token(), Some("from-env"));
    }

    #[test]
    fn unknown_backend_is_ignored() {
        let config = AppConfig::default().with_overrides(|name| {
            (name == "YOBI_STORAGE").then(|| "postgres".to_string())
        });
        assert_eq!(config.storage(), StorageBackend::Firebase);
        assert!("postgres".parse::<StorageBackend>().is_err());
        assert_eq!("mongodb".parse::<StorageBackend>(), Ok(StorageBackend::Mongo));
    }
}
