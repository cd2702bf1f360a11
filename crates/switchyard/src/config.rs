//! Bridges configuration into router settings.

use switchyard_config::RouterConfig;
use switchyard_router::RouterPolicy;

/// Builds the matching policy described by the `[router]` section.
#[must_use]
pub fn router_policy(config: &RouterConfig) -> RouterPolicy {
    RouterPolicy {
        case_sensitive: config.case_sensitive,
        default_pattern: config.default_pattern.clone(),
        suffix: config.suffix.clone(),
        domain: config.domain.clone(),
        strip_suffix: config.strip_suffix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_agree() {
        assert_eq!(router_policy(&RouterConfig::default()), RouterPolicy::default());
    }

    #[test]
    fn test_fields_carried() {
        let config = RouterConfig {
            case_sensitive: true,
            default_pattern: "[a-z]+".to_string(),
            suffix: vec!["html".to_string()],
            domain: vec!["*.example.com".to_string()],
            strip_suffix: false,
        };

        let policy = router_policy(&config);
        assert!(policy.case_sensitive);
        assert_eq!(policy.default_pattern, "[a-z]+");
        assert_eq!(policy.suffix, vec!["html"]);
        assert_eq!(policy.domain, vec!["*.example.com"]);
        assert!(!policy.strip_suffix);
    }
}
