//! Configuration sections.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Route matching settings, the `[router]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Compare literal path segments case-sensitively.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Regex used for `{name}` variables without an explicit pattern.
    #[serde(default = "default_pattern")]
    pub default_pattern: String,

    /// Suffixes accepted by routes outside any group.
    #[serde(default = "wildcard")]
    pub suffix: Vec<String>,

    /// Domains accepted by routes outside any group.
    #[serde(default = "wildcard")]
    pub domain: Vec<String>,

    /// Split a trailing `.ext` off request paths before matching.
    #[serde(default = "default_true")]
    pub strip_suffix: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            default_pattern: default_pattern(),
            suffix: wildcard(),
            domain: wildcard(),
            strip_suffix: true,
        }
    }
}

fn default_pattern() -> String {
    r"\w+".to_string()
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

/// Dispatcher behaviour, the `[dispatch]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Include error traces in rendered failures.
    #[serde(default)]
    pub debug: bool,

    /// Message carried by the not-found error of the miss fallback.
    #[serde(default = "default_not_found_message")]
    pub not_found_message: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            debug: false,
            not_found_message: default_not_found_message(),
        }
    }
}

fn default_not_found_message() -> String {
    "routing resource not found".to_string()
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Logging configuration, the `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive, e.g. `info` or `switchyard_router=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_defaults() {
        let router = RouterConfig::default();
        assert!(!router.case_sensitive);
        assert_eq!(router.default_pattern, r"\w+");
        assert_eq!(router.suffix, vec!["*"]);
        assert_eq!(router.domain, vec!["*"]);
        assert!(router.strip_suffix);
    }

    #[test]
    fn test_empty_section_uses_defaults() {
        let router: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(router, RouterConfig::default());

        let dispatch: DispatchConfig = toml::from_str("debug = true").unwrap();
        assert!(dispatch.debug);
        assert_eq!(dispatch.not_found_message, "routing resource not found");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<RouterConfig, _> = toml::from_str("sufix = [\"html\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_serde() {
        let log: LogConfig = serde_json::from_str(r#"{"format":"pretty"}"#).unwrap();
        assert_eq!(log.format, LogFormat::Pretty);
        assert_eq!(log.level, "info");
    }
}
