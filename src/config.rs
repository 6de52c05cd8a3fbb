use crate::log_debug;

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration structure for relnotes
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderSettings,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerSettings,
}

/// Settings for the chat-completion provider
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ProviderSettings {
    /// Model requested from the provider
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key. The key itself never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature. Kept low so the output stays machine-parseable.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound on a single provider call
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Extra attempts for transient provider failures (0 = single attempt)
    #[serde(default)]
    pub max_retries: usize,
}

/// Settings for `relnotes serve`
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: 0,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            port: default_port(),
        }
    }
}

/// Environment variables that override file settings
pub const ENV_MODEL: &str = "RELNOTES_MODEL";
pub const ENV_BASE_URL: &str = "RELNOTES_BASE_URL";
pub const ENV_LISTEN: &str = "RELNOTES_LISTEN";
pub const ENV_PORT: &str = "RELNOTES_PORT";

impl Config {
    /// Load configuration from `path`, or the user config file if it exists,
    /// then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::get_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        log_debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| {
            format!(
                "Invalid configuration file format in {}. Please check it for syntax errors.",
                path.display()
            )
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.provider.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(model) = get(ENV_MODEL) {
            self.provider.model = model;
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.provider.base_url = base_url;
            self.provider.endpoint()?;
        }
        if let Some(listen) = get(ENV_LISTEN) {
            self.server.listen_address = listen;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow!("Invalid {ENV_PORT} value '{port}': {e}"))?;
        }
        Ok(())
    }

    /// Path of the per-user configuration file
    fn get_config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("relnotes").join("config.toml"))
    }
}

impl ProviderSettings {
    /// Full chat-completions URL
    pub fn endpoint(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}/chat/completions"))
            .with_context(|| format!("Invalid provider base_url '{}'", self.base_url))
    }

    /// Reject settings that would make every provider call fail
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        if self.timeout_seconds == 0 {
            return Err(anyhow!("provider.timeout_seconds must be at least 1"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Read the API key from the configured environment variable.
    ///
    /// An empty value counts as absent.
    pub fn read_api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert!((config.provider.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.provider.max_retries, 0);
        assert_eq!(config.server.port, 3000);
        assert_eq!(
            config.provider.endpoint().expect("default endpoint").as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [provider]
            model = "gpt-4o"
            max_retries = 2
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_retries, 2);
        assert_eq!(config.provider.timeout_seconds, 60);
        assert_eq!(config.server, ServerSettings::default());
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = Config::from_toml_str(
            r#"
            [provider]
            base_url = "not a url"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Config::from_toml_str(
            r#"
            [provider]
            timeout_seconds = 0
            "#,
        );
        let error = result.expect_err("zero timeout must be rejected");
        assert!(error.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let settings = ProviderSettings {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ProviderSettings::default()
        };
        assert_eq!(
            settings.endpoint().expect("endpoint").as_str(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_MODEL, "gpt-4.1-mini"),
            (ENV_PORT, "8088"),
            (ENV_LISTEN, "  "),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .expect("overrides apply");
        assert_eq!(config.provider.model, "gpt-4.1-mini");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.listen_address, "127.0.0.1");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| "http".to_string()));
        assert!(result.is_err());
    }
}
