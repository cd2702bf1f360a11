//! Path templates.
//!
//! A template is a `/`-delimited path whose segments are literals or
//! variables written `{name}`. Literal templates are matched by exact
//! lookup. Variable templates compile into one anchored regex in which each
//! variable becomes a named group constrained by its pattern.

use indexmap::IndexMap;
use regex::Regex;
use switchyard_core::{DispatchError, DispatchResult};

use crate::params::Params;

/// One segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A fixed path segment.
    Literal(String),
    /// A named variable.
    Variable(String),
}

/// Normalises a template: leading `/`, no trailing `/`, literal segments
/// lowercased unless `case_sensitive`. Variable names keep their case.
#[must_use]
pub fn normalize_template(path: &str, case_sensitive: bool) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.trim().split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        if case_sensitive || variable_name(segment).is_some() {
            normalized.push_str(segment);
        } else {
            normalized.push_str(&segment.to_lowercase());
        }
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Joins a parent prefix and a child path. A root parent adds nothing and a
/// root child adds nothing.
#[must_use]
pub fn join_paths(parent: &str, child: &str) -> String {
    match (parent, child) {
        (_, "/") => parent.to_string(),
        ("/", _) => child.to_string(),
        _ => format!("{parent}{child}"),
    }
}

/// Returns the variable name if the segment is written `{name}`.
#[must_use]
pub fn variable_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Returns the variable names of a template in order of appearance.
pub fn variables(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter_map(variable_name)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A compiled template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    path: String,
    segments: Vec<Segment>,
    regex: Option<Regex>,
}

impl PathTemplate {
    /// Compiles a normalised template against its variable patterns.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed or duplicate variable
    /// names, a variable without a pattern, or a pattern that is not a
    /// valid regex.
    pub fn compile(
        path: &str,
        patterns: &IndexMap<String, String>,
        case_sensitive: bool,
    ) -> DispatchResult<Self> {
        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = variable_name(raw) {
                if !is_valid_name(name) {
                    return Err(DispatchError::configuration(format!(
                        "invalid variable `{raw}` in route `{path}`"
                    )));
                }
                if segments
                    .iter()
                    .any(|s| matches!(s, Segment::Variable(n) if n == name))
                {
                    return Err(DispatchError::configuration(format!(
                        "variable `{name}` appears twice in route `{path}`"
                    )));
                }
                segments.push(Segment::Variable(name.to_string()));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(DispatchError::configuration(format!(
                    "segment `{raw}` in route `{path}` must be a literal or a whole `{{name}}`"
                )));
            } else {
                segments.push(Segment::Literal(raw.to_string()));
            }
        }

        let has_variables = segments.iter().any(|s| matches!(s, Segment::Variable(_)));
        let regex = if has_variables {
            Some(build_regex(path, &segments, patterns, case_sensitive)?)
        } else {
            None
        };

        Ok(Self {
            path: path.to_string(),
            segments,
            regex,
        })
    }

    /// Returns the normalised template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Returns the template segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the template has no variables.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.regex.is_none()
    }

    /// Returns the lookup key of a literal template.
    #[must_use]
    pub fn literal_key(&self, case_sensitive: bool) -> String {
        if case_sensitive {
            self.path.clone()
        } else {
            self.path.to_lowercase()
        }
    }

    /// Matches a normalised request path, returning the variable bindings.
    ///
    /// Variables bind exactly one segment each.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let regex = self.regex.as_ref()?;
        let depth = path.split('/').filter(|s| !s.is_empty()).count();
        if depth != self.segments.len() {
            return None;
        }

        let caps = regex.captures(path)?;
        let mut params = Params::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                let value = caps.name(name)?.as_str();
                if value.contains('/') {
                    return None;
                }
                params.push(name.as_str(), value);
            }
        }
        Some(params)
    }
}

fn build_regex(
    path: &str,
    segments: &[Segment],
    patterns: &IndexMap<String, String>,
    case_sensitive: bool,
) -> DispatchResult<Regex> {
    let mut source = String::from("^");
    for segment in segments {
        source.push('/');
        match segment {
            Segment::Literal(text) if case_sensitive => source.push_str(&regex::escape(text)),
            Segment::Literal(text) => {
                source.push_str("(?i:");
                source.push_str(&regex::escape(text));
                source.push(')');
            }
            Segment::Variable(name) => {
                let pattern = patterns.get(name).ok_or_else(|| {
                    DispatchError::configuration(format!(
                        "variable `{name}` in route `{path}` has no pattern"
                    ))
                })?;
                source.push_str(&format!("(?P<{name}>(?:{pattern}))"));
            }
        }
    }
    source.push('$');

    Regex::new(&source).map_err(|err| {
        DispatchError::configuration(format!("route `{path}` has an invalid pattern: {err}"))
    })
}
