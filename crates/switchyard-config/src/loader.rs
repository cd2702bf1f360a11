//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, SwitchyardConfig};

/// Builds a [`SwitchyardConfig`] from layered sources.
///
/// Later layers override earlier ones:
/// 1. Defaults (or a preset)
/// 2. A TOML or JSON file
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use switchyard_config::ConfigLoader;
///
/// # fn main() -> Result<(), switchyard_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("switchyard.toml")?
///     .with_env_prefix("SWITCHYARD")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SwitchyardConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SwitchyardConfig::default(),
            env_prefix: None,
        }
    }

    /// Reset to the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SwitchyardConfig::development();
        self
    }

    /// Reset to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SwitchyardConfig::production();
        self
    }

    /// Load a configuration file, choosing the format by extension.
    ///
    /// The file replaces the current configuration; sections it omits take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))?;

        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is not an error.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `toml` or `json` format.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[router]\ncase_sensitive = true", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.router.case_sensitive);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Apply `PREFIX__SECTION__KEY` environment overrides on load.
    ///
    /// List values (`ROUTER__SUFFIX`, `ROUTER__DOMAIN`) are comma-separated.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load variables from a `.env` file into the process environment, if one exists.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<SwitchyardConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SwitchyardConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let bool_value = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        match parts.as_slice() {
            ["ROUTER", "CASE_SENSITIVE"] => self.config.router.case_sensitive = bool_value()?,
            ["ROUTER", "DEFAULT_PATTERN"] => {
                self.config.router.default_pattern = value.to_string();
            }
            ["ROUTER", "SUFFIX"] => self.config.router.suffix = parse_list(value),
            ["ROUTER", "DOMAIN"] => self.config.router.domain = parse_list(value),
            ["ROUTER", "STRIP_SUFFIX"] => self.config.router.strip_suffix = bool_value()?,

            ["DISPATCH", "DEBUG"] => self.config.dispatch.debug = bool_value()?,
            ["DISPATCH", "NOT_FOUND_MESSAGE"] => {
                self.config.dispatch.not_found_message = value.to_string();
            }

            ["LOGGING", "ENABLED"] => self.config.logging.enabled = bool_value()?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|reason: String| ConfigError::env_parse_error(key, reason))?;
            }
            ["LOGGING", "ANSI_ENABLED"] => self.config.logging.ansi_enabled = bool_value()?,

            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<SwitchyardConfig, ConfigError> {
    match format.to_ascii_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::unsupported_format(format)),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// `a, b ,c` -> ["a", "b", "c"]; a lone empty item is kept so `""` can be listed.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',').map(|item| item.trim().to_string()).collect()
}
