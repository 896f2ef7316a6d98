//! Configuration loading and config file resolution
//!
//! Every setting has a built-in default, so running without any config file
//! is the normal case. Config file resolution priority:
//! 1. Explicit path (command-line argument)
//! 2. `REFTAG_CONFIG` environment variable
//! 3. `<config_dir>/reftag/config.toml`
//! 4. Built-in defaults
//!
//! A missing file at tiers 2 and 3 logs a warning and falls through. An
//! explicit path that cannot be read, or any file that fails to parse, is a
//! configuration error.

use crate::classifier::PatternClassifier;
use crate::encoding::{TagFormat, DEFAULT_AUTO_TAG_MARKER, DEFAULT_PLACEHOLDER};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "REFTAG_CONFIG";

/// Tagging configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Data-layer key receiving the tag (and holding the recorded identifier)
    #[serde(default = "default_identifier_key")]
    pub data_layer_key: String,

    /// Query parameter carrying an explicit identifier
    #[serde(default = "default_identifier_key")]
    pub query_parameter: String,

    /// Session-storage key of the per-session event counter
    #[serde(default = "default_session_counter_key")]
    pub session_counter_key: String,

    /// Marker written into tag fields 2 and 3
    #[serde(default = "default_auto_tag_marker")]
    pub auto_tag_marker: String,

    /// Filler for the reserved tag fields 5 to 9
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Extra internal redirect hosts (e.g. a CRM linking to the site)
    #[serde(default)]
    pub internal_markers: Vec<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_identifier_key() -> String {
    "ecid".to_string()
}

fn default_session_counter_key() -> String {
    "adobeAnalyticsSessionEventCount".to_string()
}

fn default_auto_tag_marker() -> String {
    DEFAULT_AUTO_TAG_MARKER.to_string()
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            data_layer_key: default_identifier_key(),
            query_parameter: default_identifier_key(),
            session_counter_key: default_session_counter_key(),
            auto_tag_marker: default_auto_tag_marker(),
            placeholder: default_placeholder(),
            internal_markers: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TaggingConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read {} failed: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded tagging config from {}", path.display());
        Ok(config)
    }

    /// Reject settings that would break matching or encoding
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("data_layer_key", &self.data_layer_key),
            ("query_parameter", &self.query_parameter),
            ("session_counter_key", &self.session_counter_key),
            ("auto_tag_marker", &self.auto_tag_marker),
            ("placeholder", &self.placeholder),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", name)));
            }
        }

        // A dot inside a field would shift every later field of the tag
        for (name, value) in [
            ("auto_tag_marker", &self.auto_tag_marker),
            ("placeholder", &self.placeholder),
        ] {
            if value.contains('.') {
                return Err(Error::Config(format!("{} must not contain '.'", name)));
            }
        }

        Ok(())
    }

    /// Tag notation
    pub fn format(&self) -> TagFormat {
        TagFormat {
            auto_tag_marker: self.auto_tag_marker.clone(),
            placeholder: self.placeholder.clone(),
        }
    }

    /// Rule table including the configured internal hosts
    pub fn classifier(&self) -> PatternClassifier {
        PatternClassifier::with_internal_markers(self.internal_markers.as_slice())
    }
}

/// Locates and loads the tagging config
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self { explicit_path }
    }

    /// Resolve the config, degrading to defaults when no file is found
    pub fn resolve(&self) -> Result<TaggingConfig> {
        // Priority 1: explicit path must exist
        if let Some(path) = &self.explicit_path {
            return TaggingConfig::load(path);
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return TaggingConfig::load(&path);
            }
            warn!(
                "{} points to missing file {}, ignoring",
                CONFIG_ENV_VAR,
                path.display()
            );
        }

        // Priority 3: per-user config directory
        if let Some(path) = default_config_path() {
            if path.exists() {
                return TaggingConfig::load(&path);
            }
            debug!("No config file at {}", path.display());
        }

        // Priority 4: built-in defaults
        info!("No tagging config file found, using built-in defaults");
        Ok(TaggingConfig::default())
    }
}

/// `<config_dir>/reftag/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reftag").join("config.toml"))
}
