//! TOML Configuration File Support
//!
//! Centralized configuration loading for the gallery engine, supporting a
//! TOML file at `~/.config/photo-gallery/gallery.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://around.example.com/v1/group-12"
//! auth_token = "190e9486-0000-0000-0000-000000000000"
//! request_timeout_ms = 10000
//!
//! [ui]
//! error_dismiss_secs = 5
//! strict_contracts = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Base URL of the cards/users API
    pub base_url: Option<String>,

    /// Value sent in the `Authorization` header
    pub auth_token: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: Option<u64>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Seconds before the error toast hides itself
    pub error_dismiss_secs: Option<u64>,

    /// Report contract violations as errors instead of logging them
    pub strict_contracts: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryToml {
    /// API section
    pub api: ApiToml,

    /// UI section
    pub ui: UiToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the gallery engine
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    /// Base URL of the cards/users API
    pub base_url: String,

    /// Value sent in the `Authorization` header
    pub auth_token: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// How long the error toast stays up
    pub error_dismiss: Duration,

    /// Report contract violations as errors (on by default in debug builds)
    pub strict_contracts: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://around.nomoreparties.co/v1/group-12".to_string(),
            auth_token: String::new(),
            request_timeout: Duration::from_secs(10),
            error_dismiss: Duration::from_secs(5),
            strict_contracts: cfg!(debug_assertions),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl GalleryConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Set the error toast delay
    #[must_use]
    pub fn with_error_dismiss(mut self, delay: Duration) -> Self {
        self.error_dismiss = delay;
        self
    }

    /// Set contract strictness
    #[must_use]
    pub fn with_strict_contracts(mut self, strict: bool) -> Self {
        self.strict_contracts = strict;
        self
    }

    /// Check the loaded values for consistency
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty base URL or a
    /// zero toast delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.error_dismiss.is_zero() {
            return Err(ConfigError::ValidationError(
                "ui.error_dismiss_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// CLI-level overrides applied on top of file and environment values
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,
    /// Auth token override
    pub auth_token: Option<String>,
    /// Strictness override
    pub strict_contracts: Option<bool>,
}

impl ConfigOverrides {
    /// Apply the overrides to a loaded configuration
    pub fn apply(&self, config: &mut GalleryConfig) {
        if let Some(ref url) = self.base_url {
            config.base_url.clone_from(url);
            config.source = ConfigSource::Cli;
        }
        if let Some(ref token) = self.auth_token {
            config.auth_token.clone_from(token);
            config.source = ConfigSource::Cli;
        }
        if let Some(strict) = self.strict_contracts {
            config.strict_contracts = strict;
            config.source = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/photo-gallery/gallery.toml` or
/// `~/.config/photo-gallery/gallery.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("photo-gallery").join("gallery.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<GalleryConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<GalleryConfig, ConfigError> {
    let mut config = load_file_config(path)?;
    apply_env_config(&mut config);
    Ok(config)
}

/// Defaults plus the TOML file, without environment overrides
fn load_file_config(path: Option<PathBuf>) -> Result<GalleryConfig, ConfigError> {
    let mut config = GalleryConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: GalleryToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut GalleryConfig, toml: &GalleryToml) {
    if let Some(ref url) = toml.api.base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(ref token) = toml.api.auth_token {
        config.auth_token.clone_from(token);
    }
    if let Some(ms) = toml.api.request_timeout_ms {
        config.request_timeout = Duration::from_millis(ms);
    }

    if let Some(secs) = toml.ui.error_dismiss_secs {
        config.error_dismiss = Duration::from_secs(secs);
    }
    if let Some(strict) = toml.ui.strict_contracts {
        config.strict_contracts = strict;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut GalleryConfig) {
    if let Ok(url) = std::env::var("GALLERY_API_URL") {
        config.base_url = url.trim_end_matches('/').to_string();
        config.source = ConfigSource::Env;
    }
    if let Ok(token) = std::env::var("GALLERY_API_TOKEN") {
        config.auth_token = token;
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("GALLERY_REQUEST_TIMEOUT_MS") {
        if let Ok(ms) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(delay) = std::env::var("GALLERY_ERROR_DISMISS_SECS") {
        if let Ok(secs) = delay.parse::<u64>() {
            config.error_dismiss = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(strict) = std::env::var("GALLERY_STRICT_CONTRACTS") {
        config.strict_contracts = strict == "1" || strict.to_lowercase() == "true";
        config.source = ConfigSource::Env;
    }
}
