use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FRED_BASE_URL: &str = "https://fred.stlouisfed.org";
pub const DEFAULT_TSP_BASE_URL: &str = "https://www.tspdatacenter.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TspProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fred: Option<FredProviderConfig>,
    pub tsp: Option<TspProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fred: Some(FredProviderConfig {
                base_url: DEFAULT_FRED_BASE_URL.to_string(),
            }),
            tsp: Some(TspProviderConfig {
                base_url: DEFAULT_TSP_BASE_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_producer() -> String {
    "tspfed".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub data_path: Option<String>,
    #[serde(default = "default_producer")]
    pub producer: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            http: HttpConfig::default(),
            data_path: None,
            producer: default_producer(),
        }
    }
}

impl AppConfig {
    /// Loads the config at `path` if given, else the default config file.
    /// A missing default file falls back to built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let default_path = Self::default_config_path()?;
        if default_path.exists() {
            Self::load_from_path(&default_path)
        } else {
            debug!(
                "No config at {}, using built-in defaults",
                default_path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "tspfed", "tspfed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "tspfed", "tspfed")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn fred_base_url(&self) -> &str {
        self.providers
            .fred
            .as_ref()
            .map_or(DEFAULT_FRED_BASE_URL, |p| &p.base_url)
    }

    pub fn tsp_base_url(&self) -> &str {
        self.providers
            .tsp
            .as_ref()
            .map_or(DEFAULT_TSP_BASE_URL, |p| &p.base_url)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "/srv/tspfed"
providers:
  fred:
    base_url: "http://example.com/fred"
  tsp:
    base_url: "http://example.com/tsp"
http:
  timeout_secs: 5
  user_agent: "test-agent"
producer: "moose-core"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.fred_base_url(), "http://example.com/fred");
        assert_eq!(config.tsp_base_url(), "http://example.com/tsp");
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert_eq!(config.http.user_agent, "test-agent");
        assert_eq!(config.producer, "moose-core");
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/srv/tspfed"));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: /tmp/x\n").unwrap();
        assert_eq!(config.fred_base_url(), DEFAULT_FRED_BASE_URL);
        assert_eq!(config.tsp_base_url(), DEFAULT_TSP_BASE_URL);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.user_agent, "Mozilla/5.0");
        assert_eq!(config.producer, "tspfed");

        // A partial http section keeps the remaining defaults
        let config: AppConfig = serde_yaml::from_str("http:\n  timeout_secs: 10\n").unwrap();
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.user_agent, "Mozilla/5.0");
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_providers_section_without_tsp() {
        let yaml_str = r#"
providers:
  fred:
    base_url: "http://localhost:1234"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert!(config.providers.tsp.is_none());
        assert_eq!(config.tsp_base_url(), DEFAULT_TSP_BASE_URL);
        assert_eq!(config.fred_base_url(), "http://localhost:1234");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_or_default(Some("/nonexistent/tspfed/config.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .starts_with("Failed to read config file")
        );
    }
}
