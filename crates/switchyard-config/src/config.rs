//! Root configuration type.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::{ConfigError, DispatchConfig, LogConfig, LogFormat, RouterConfig};

/// Complete Switchyard configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer a file and environment
/// variables over these defaults.
///
/// # Example
///
/// ```
/// use switchyard_config::SwitchyardConfig;
///
/// let config = SwitchyardConfig::default();
/// assert_eq!(config.router.default_pattern, r"\w+");
/// assert!(!config.dispatch.debug);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Route matching settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Dispatcher behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Logging output.
    #[serde(default)]
    pub logging: LogConfig,
}

impl SwitchyardConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `router.default_pattern` is not a valid regex
    /// - `router.domain` contains a blank entry
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = regex::Regex::new(&format!("^(?:{})$", self.router.default_pattern)) {
            return Err(ConfigError::invalid_value(
                "router.default_pattern",
                e.to_string(),
            ));
        }

        if self.router.domain.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "router.domain",
                "domain entries must not be blank",
            ));
        }

        if self.logging.enabled {
            if let Err(e) = EnvFilter::try_new(&self.logging.level) {
                return Err(ConfigError::invalid_value("logging.level", e.to_string()));
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs and error traces in responses.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_config::{LogFormat, SwitchyardConfig};
    ///
    /// let config = SwitchyardConfig::development();
    /// assert!(config.dispatch.debug);
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.dispatch.debug = true;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config
    }

    /// Production preset: JSON logs at `info`, traces hidden.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.dispatch.debug = false;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        SwitchyardConfig::default().validate().unwrap();
        SwitchyardConfig::development().validate().unwrap();
        SwitchyardConfig::production().validate().unwrap();
    }

    #[test]
    fn test_invalid_default_pattern() {
        let mut config = SwitchyardConfig::default();
        config.router.default_pattern = "(unclosed".to_string();

        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("router.default_pattern"));
    }

    #[test]
    fn test_blank_domain_rejected() {
        let mut config = SwitchyardConfig::default();
        config.router.domain = vec!["example.com".to_string(), " ".to_string()];

        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("router.domain"));
    }

    #[test]
    fn test_empty_suffix_entry_allowed() {
        let mut config = SwitchyardConfig::default();
        config.router.suffix = vec!["html".to_string(), String::new()];
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = SwitchyardConfig::default();
        config.logging.level = "switchyard=loudest".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("logging.level"));

        config.logging.enabled = false;
        config.validate().unwrap();
    }

    #[test]
    fn test_presets_differ_in_debug() {
        assert!(SwitchyardConfig::development().dispatch.debug);
        assert!(!SwitchyardConfig::production().dispatch.debug);
    }

    #[test]
    fn test_toml_roundtrip_of_sections() {
        let toml = r#"
            [router]
            case_sensitive = true
            suffix = ["html", ""]

            [dispatch]
            not_found_message = "nothing here"

            [logging]
            level = "warn"
            format = "pretty"
        "#;

        let config: SwitchyardConfig = toml::from_str(toml).unwrap();
        assert!(config.router.case_sensitive);
        assert_eq!(config.router.suffix, vec!["html", ""]);
        assert_eq!(config.router.domain, vec!["*"]);
        assert_eq!(config.dispatch.not_found_message, "nothing here");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }
}
