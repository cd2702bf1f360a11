//! Matching policy: path normalisation, host and suffix rules.
//!
//! # Hosts
//!
//! The port is ignored. `example.com:8080` is compared as `example.com` and
//! `[::1]:8080` as `::1`. A bare IPv6 literal without brackets is compared
//! whole. Domain entries are compared case-insensitively:
//!
//! | Entry | Matches |
//! |---|---|
//! | `*` | any host |
//! | `*.example.com` | `a.example.com`, `a.b.example.com`, not `example.com` |
//! | `api.example.com` | exactly that host |
//!
//! An empty domain list accepts every host.
//!
//! # Suffixes
//!
//! The pseudo-static suffix is the text after the last `.` of the final
//! path segment, so `/files/a.tar.gz` has suffix `gz`. A leading dot
//! (`/.env`) or a trailing dot is not a suffix. An entry of `*` accepts any
//! suffix and no suffix. Otherwise a request with a suffix must list it and
//! a request without one is accepted only if the list contains `""`.

/// Built-in pattern for variables without an explicit rule.
pub const DEFAULT_PATTERN: &str = r"\w+";

/// Table-wide matching settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterPolicy {
    /// Compare literal path segments case-sensitively.
    pub case_sensitive: bool,
    /// Pattern for variables without an explicit rule.
    pub default_pattern: String,
    /// Suffixes accepted by top-level routes.
    pub suffix: Vec<String>,
    /// Domains accepted by top-level routes.
    pub domain: Vec<String>,
    /// Split a trailing `.ext` from request paths before matching.
    pub strip_suffix: bool,
}

impl Default for RouterPolicy {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            default_pattern: DEFAULT_PATTERN.to_string(),
            suffix: vec!["*".to_string()],
            domain: vec!["*".to_string()],
            strip_suffix: true,
        }
    }
}

/// Normalises a request path: leading `/`, no empty segments, no trailing `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Returns the host without its port.
#[must_use]
pub fn host_name(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map_or(rest, |(inner, _)| inner);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            name
        }
        _ => host,
    }
}

/// Returns `true` if `host` satisfies one of `domains`.
#[must_use]
pub fn domain_allows(domains: &[String], host: &str) -> bool {
    if domains.is_empty() {
        return true;
    }
    let name = host_name(host);
    domains.iter().any(|domain| domain_matches(domain, name))
}

fn domain_matches(domain: &str, name: &str) -> bool {
    if domain == "*" {
        return true;
    }
    if let Some(parent) = domain.strip_prefix("*.") {
        return name.len() > parent.len() + 1
            && name
                .get(name.len() - parent.len() - 1..)
                .and_then(|tail| tail.strip_prefix('.'))
                .is_some_and(|tail| tail.eq_ignore_ascii_case(parent));
    }
    name.eq_ignore_ascii_case(domain)
}

/// Splits a normalised path into its stem and pseudo-static suffix.
#[must_use]
pub fn split_suffix(path: &str) -> Option<(&str, &str)> {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let dot = path[segment_start..].rfind('.')? + segment_start;
    if dot == segment_start || dot + 1 == path.len() {
        return None;
    }
    Some((&path[..dot], &path[dot + 1..]))
}

/// Returns `true` if `suffix` (or its absence) is permitted by `suffixes`.
#[must_use]
pub fn suffix_allows(suffixes: &[String], suffix: Option<&str>) -> bool {
    if suffixes.iter().any(|s| s == "*") {
        return true;
    }
    let wanted = suffix.unwrap_or("");
    suffixes
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(wanted))
}
