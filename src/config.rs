use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::credentials::{Credentials, Endpoint, Environment};

/// Main AllSign configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub credentials: CredentialsConfig,
    pub execution: ExecutionConfig,
    pub http: HttpConfig,
    /// File this config was read from; `None` when running on defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Log level for the file logger
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            _ => eyre::bail!("Unknown log level: {}", s),
        }
    }
}

/// Stored credential fields, as written in allsign.yaml
///
/// Either `base_url` or `environment` selects the endpoint; `base_url` wins
/// when both are set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Emit `{error}` records instead of aborting on the first failing item
    pub continue_on_fail: bool,
    /// Where binary attachments (downloads) are written
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Global request timeout; unset means the transport never times out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            continue_on_fail: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check ALLSIGN_CONFIG env var
        if let Ok(env_path) = std::env::var("ALLSIGN_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from ALLSIGN_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try ALLSIGN_DIR/allsign.yaml
        if let Ok(dir) = std::env::var("ALLSIGN_DIR") {
            let path = PathBuf::from(dir).join("allsign.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from ALLSIGN_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/allsign/allsign.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("allsign").join("allsign.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./allsign.yaml (for development)
        let local_config = PathBuf::from("allsign.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let mut config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.source = Some(path.as_ref().to_path_buf());

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding allsign.yaml
    pub fn allsign_dir() -> PathBuf {
        std::env::var("ALLSIGN_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("allsign"))
    }

    /// API key from ALLSIGN_API_KEY, falling back to the config file
    pub fn api_key(&self) -> Option<String> {
        std::env::var("ALLSIGN_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.credentials.api_key.clone().filter(|key| !key.trim().is_empty()))
    }

    /// Credentials for this run; a missing API key is an error
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        let api_key = self.api_key().ok_or_else(|| {
            eyre::eyre!("No API key configured. Set ALLSIGN_API_KEY or run `allsign config set credentials.api_key <key>`")
        })?;
        Ok(Credentials::new(api_key, Endpoint::from_config(&self.credentials)))
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(!config.execution.continue_on_fail);
        assert!(config.credentials.base_url.is_none());
        assert!(config.http.timeout_secs.is_none());
    }

    #[test]
    fn test_parse_credentials_with_environment() {
        let yaml = r#"
credentials:
  api_key: allsign_live_sk_test
  environment: sandbox
execution:
  continue_on_fail: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.credentials.api_key.as_deref(), Some("allsign_live_sk_test"));
        assert_eq!(config.credentials.environment, Some(Environment::Sandbox));
        assert!(config.execution.continue_on_fail);
        assert_eq!(config.execution.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/bin");
        let expanded = Config::expand_path(&path);
        assert_eq!(expanded, PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/downloads");
        let expanded = Config::expand_path(&path);
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.to_string_lossy().contains("downloads"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.credentials.base_url = Some("https://api.allsign.io".to_string());
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.credentials.base_url, config.credentials.base_url);
        assert_eq!(parsed.log_level, config.log_level);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("allsign.yaml");
        fs::write(&path, "log_level: debug\nhttp:\n  timeout_secs: 30\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.http.timeout_secs, Some(30));
        assert_eq!(config.source.as_ref(), Some(&path));
        assert!(!serde_yaml::to_string(&config).unwrap().contains("source"));
    }

    #[test]
    fn test_resolve_credentials_endpoint() {
        let mut config = Config::default();
        config.credentials.api_key = Some("allsign_live_sk_test".to_string());
        config.credentials.environment = Some(Environment::Sandbox);
        let resolved = config.resolve_credentials().unwrap().resolve();
        assert_eq!(resolved.base_url, "https://api-sandbox.allsign.io");

        config.credentials.base_url = Some("http://127.0.0.1:9000/".to_string());
        let resolved = config.resolve_credentials().unwrap().resolve();
        assert_eq!(resolved.base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let path = PathBuf::from("/nonexistent/allsign.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
