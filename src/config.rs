//! Instance defaults for a [`Normalizer`](crate::Normalizer).
//!
//! Defaults can be built in code or parsed from TOML:
//!
//! ```rust
//! use remie::{Level, NormalizerConfig};
//!
//! let config = NormalizerConfig::from_toml_str(r#"
//!     default_message = "Something broke"
//!     default_status_code = 503
//!     default_level = "fatal"
//!
//!     [sanitize.error]
//!     stack = true
//! "#).unwrap();
//!
//! assert_eq!(config.default_status_code.value(), 503);
//! assert_eq!(config.default_level, Level::Fatal);
//! assert_eq!(config.default_locale, "server.500.generic");
//! ```

use crate::codes::StatusCode;
use crate::models::Level;
use crate::presenter::VisibilityPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when no better one is available.
pub const DEFAULT_ERROR_MESSAGE: &str = "Internal server error!";

/// Locale key for the generic server error.
pub const DEFAULT_ERROR_LOCALE: &str = "server.500.generic";

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("failed to parse normalizer configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("normalizer configuration validation failed: {0}")]
    ValidationError(String),
}

/// Defaults applied by a normalizer when neither the options nor the input
/// provide a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Message for the generic error and for opaque inputs without one.
    pub default_message: String,
    /// Locale key for the generic error.
    pub default_locale: String,
    /// Status code when nothing else sets one.
    pub default_status_code: StatusCode,
    /// Level when nothing else sets one.
    pub default_level: Level,
    /// Policy used when a record carries none.
    pub sanitize: VisibilityPolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_ERROR_MESSAGE.to_owned(),
            default_locale: DEFAULT_ERROR_LOCALE.to_owned(),
            default_status_code: StatusCode::INTERNAL_SERVER_ERROR,
            default_level: Level::Error,
            sanitize: VisibilityPolicy::default(),
        }
    }
}

impl NormalizerConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ParseError` for invalid TOML, unknown levels, or status
    ///   codes outside `100..=599`
    /// - `ConfigError::ValidationError` if [`NormalizerConfig::validate`] fails
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `default_message` is empty
    /// - `default_locale` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_message.is_empty() {
            return Err(ConfigError::ValidationError(
                "default_message cannot be empty".to_string(),
            ));
        }
        if self.default_locale.is_empty() {
            return Err(ConfigError::ValidationError(
                "default_locale cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
