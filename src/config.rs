//! Configuration management for anidex.
//!
//! Config files may be TOML, YAML or JSON, chosen by extension. Every field
//! has a default, so a missing file or a partial one is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{RetryPolicy, DEFAULT_PAGE_SIZE};
use crate::throttle::ThrottleConfig;

/// Public catalog endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Basename searched for during config discovery.
pub const CONFIG_BASENAME: &str = "anidex";

/// File holding liked/disliked lists inside the data directory.
pub const PREFERENCES_FILENAME: &str = "preferences.json";

const ENV_API_BASE_URL: &str = "ANIDEX_API_BASE_URL";
const ENV_DATA_DIR: &str = "ANIDEX_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Invalid API base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL must be http or https, got {0:?}")]
    UnsupportedScheme(String),
}

/// Upstream API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Fetch client timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub settle_delay_ms: u64,
    pub base_delay_ms: u64,
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            settle_delay_ms: as_millis(policy.settle_delay),
            base_delay_ms: as_millis(policy.base_delay),
            max_retries: policy.max_retries,
        }
    }
}

/// Navigation throttle timing, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub window_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let throttle = ThrottleConfig::default();
        Self {
            base_delay_ms: as_millis(throttle.base_delay),
            max_delay_ms: as_millis(throttle.max_delay),
            window_ms: as_millis(throttle.window),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub navigation: NavigationConfig,
    /// Data directory path; relative paths resolve against the config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

/// Options for loading configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Resolve relative paths from the current directory instead of the config file.
    pub use_cwd: bool,
}

impl Config {
    /// Load configuration from a specific file path.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load a file found by discovery, falling back to defaults when it is
    /// missing or broken.
    pub async fn load_discovered(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_path(path).await {
            Ok(config) => {
                tracing::debug!("Using discovered config: {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Load configuration: explicit path, then discovery, then defaults.
    /// Environment overrides are applied last.
    ///
    /// An explicit `--config` file that cannot be read or parsed is an error.
    /// A discovered file that fails to parse is logged and ignored.
    pub async fn load(options: &LoadOptions) -> Result<Self, ConfigError> {
        let config = match &options.config_path {
            Some(path) => Self::load_from_path(path).await?,
            None => {
                let discovered = discover_config_file(CONFIG_BASENAME).await;
                Self::load_discovered(discovered.as_deref()).await
            }
        };

        let config = config.with_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Check that the API base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed =
            url::Url::parse(&self.api.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
                url: self.api.base_url.clone(),
                source,
            })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Apply `ANIDEX_*` overrides from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|s| !s.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|s| !s.is_empty()) {
            self.data_dir = Some(dir);
        }
        self
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to `base_dir`, expanding `~`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Directory for local data such as preferences.
    pub fn data_dir(&self, options: &LoadOptions) -> PathBuf {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        match &self.data_dir {
            Some(dir) => {
                let base = if options.use_cwd {
                    cwd
                } else {
                    self.base_dir().unwrap_or(cwd)
                };
                self.resolve_path(dir, &base)
            }
            None => dirs::data_dir()
                .map(|d| d.join(CONFIG_BASENAME))
                .unwrap_or_else(|| cwd.join(format!(".{}", CONFIG_BASENAME))),
        }
    }

    pub fn preferences_path(&self, options: &LoadOptions) -> PathBuf {
        self.data_dir(options).join(PREFERENCES_FILENAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            settle_delay: Duration::from_millis(self.fetch.settle_delay_ms),
            base_delay: Duration::from_millis(self.fetch.base_delay_ms),
            max_retries: self.fetch.max_retries,
        }
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            base_delay: Duration::from_millis(self.navigation.base_delay_ms),
            max_delay: Duration::from_millis(self.navigation.max_delay_ms),
            window: Duration::from_millis(self.navigation.window_ms),
        }
    }
}

/// Find a config file for `name` in the standard locations.
async fn discover_config_file(name: &str) -> Option<PathBuf> {
    match prefer::load(name).await {
        Ok(found) => found.source_path().map(|p| p.to_path_buf()),
        Err(_) => None,
    }
}

/// Duration as whole milliseconds, saturating.
fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_components() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.throttle_config(), ThrottleConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_load_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "state"

[fetch]
max_retries = 5

[navigation]
max_delay_ms = 6000
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.fetch.base_delay_ms, 1500);
        assert_eq!(config.navigation.max_delay_ms, 6000);
        assert_eq!(config.navigation.base_delay_ms, 500);
        assert_eq!(
            config.data_dir(&LoadOptions::default()),
            dir.path().join("state")
        );
        assert_eq!(
            config.preferences_path(&LoadOptions::default()),
            dir.path().join("state").join(PREFERENCES_FILENAME)
        );
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("anidex.yaml");
        std::fs::write(&yaml, "api:\n  page_size: 25\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.api.page_size, 25);

        let json = dir.path().join("anidex.json");
        std::fs::write(&json, r#"{"api": {"base_url": "http://localhost:9999"}}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9999");
    }

    #[tokio::test]
    async fn test_parse_error_names_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.toml");
        std::fs::write(&path, "[fetch\nmax_retries = ").unwrap();

        let err = Config::load_from_path(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "TOML", .. }));
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let options = LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/anidex.toml")),
            use_cwd: false,
        };
        assert!(matches!(
            Config::load(&options).await,
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env_overrides(|key| match key {
            "ANIDEX_API_BASE_URL" => Some("http://127.0.0.1:8080/v4".to_string()),
            "ANIDEX_DATA_DIR" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://127.0.0.1:8080/v4");
        assert!(config.data_dir.is_none());
    }

    #[tokio::test]
    async fn test_nothing_discovered_for_unknown_app() {
        assert!(discover_config_file("anidex-unknown-app-7d3f9c")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_broken_discovered_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.toml");
        std::fs::write(&path, "[fetch\nmax_retries = ").unwrap();

        let config = Config::load_discovered(Some(&path)).await;
        assert_eq!(config.fetch, FetchConfig::default());
        assert!(config.source_path.is_none());

        std::fs::write(&path, "[fetch]\nmax_retries = 7\n").unwrap();
        let config = Config::load_discovered(Some(&path)).await;
        assert_eq!(config.fetch.max_retries, 7);
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));

        assert!(Config::load_discovered(None).await.source_path.is_none());
    }

    #[tokio::test]
    async fn test_broken_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anidex.json");
        std::fs::write(&path, "{not json").unwrap();

        let options = LoadOptions {
            config_path: Some(path),
            use_cwd: false,
        };
        assert!(matches!(
            Config::load(&options).await,
            Err(ConfigError::Parse { format: "JSON", .. })
        ));
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(as_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(as_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_validate_base_url() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.api.base_url = "api.jikan.moe/v4".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        config.api.base_url = "ftp://api.jikan.moe/v4".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedScheme(ref s)) if s == "ftp"
        ));
    }
}
