//! Configuration management for ticky
//!
//! This module handles locating the per-user config directory and loading,
//! parsing, and validating the optional settings file.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_GENERATED, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_LISTEN_ADDR, DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_REDIRECT_URI, DEFAULT_SCOPE, DEFAULT_TOKEN_URL,
    ENV_CONFIG_DIR, LOCAL_SETTINGS_FILE, SETTINGS_FILE,
};
use crate::utils::date::DATE_FORMAT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub oauth: OAuthSettings,
    pub logging: LoggingConfig,
}

/// TickTick Open API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every API path is appended to
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// OAuth endpoints and local callback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthSettings {
    pub auth_url: String,
    pub token_url: String,
    /// Must match the redirect URI registered for the client
    pub redirect_uri: String,
    /// Loopback address the callback listener binds to
    pub listen_addr: String,
    pub scope: String,
    /// How long to wait for the browser callback, in seconds
    pub login_timeout_secs: u64,
    /// Try to open the authorization URL in the default browser
    pub open_browser: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also append log records to `ticky.log` in the config directory
    pub enabled: bool,
    /// Level used when no `-v` flag is given
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            login_timeout_secs: DEFAULT_LOGIN_TIMEOUT_SECS,
            open_browser: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "warn".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OAuthSettings {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(LOCAL_SETTINGS_FILE);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check the ticky config directory
        let user_config = Self::get_default_config_path()?;
        if user_config.exists() {
            return Ok(Some(user_config));
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_url("oauth.auth_url", &self.oauth.auth_url)?;
        validate_url("oauth.token_url", &self.oauth.token_url)?;
        validate_url("oauth.redirect_uri", &self.oauth.redirect_uri)?;

        if self.api.timeout_secs == 0 || self.api.timeout_secs > 600 {
            anyhow::bail!("api.timeout_secs must be between 1 and 600, got {}", self.api.timeout_secs);
        }

        if self.oauth.login_timeout_secs == 0 || self.oauth.login_timeout_secs > 3600 {
            anyhow::bail!(
                "oauth.login_timeout_secs must be between 1 and 3600, got {}",
                self.oauth.login_timeout_secs
            );
        }

        if self.oauth.listen_addr.trim().is_empty() {
            anyhow::bail!("oauth.listen_addr cannot be empty");
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid logging.level '{}', expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            );
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# ticky Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format(DATE_FORMAT)
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        log::info!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the ticky config directory path
    pub fn get_config_dir() -> Result<PathBuf> {
        config_dir_from(|key| std::env::var(key).ok())
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join(SETTINGS_FILE))
    }
}

/// Resolve the config directory: `$TICKY_CONFIG_DIR`, else `~/.config/ticky`.
pub fn config_dir_from<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(ENV_CONFIG_DIR).filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
        .map(|home| home.join(".config").join(CONFIG_DIR_NAME))
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        anyhow::bail!("{} must be an http(s) URL, got '{}'", field, value)
    }
}
