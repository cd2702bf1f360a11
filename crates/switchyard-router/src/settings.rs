//! Batch route and group options.
//!
//! [`RouteSettings`] is how groups receive their options and how
//! declarative route metadata is applied. Keys that are absent leave the
//! inherited value alone.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use switchyard_core::{DispatchError, DispatchResult};
use switchyard_middleware::MiddlewareRef;

use crate::method::MethodSet;

/// A batch of route options.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use switchyard_router::RouteSettings;
///
/// let settings = RouteSettings::from_json(&json!({
///     "methods": ["GET", "POST"],
///     "middleware": ["Auth"],
///     "suffix": "html",
///     "pattern": {"id": "\\d+"},
/// }))
/// .unwrap();
/// # let _ = settings;
///
/// assert!(RouteSettings::from_json(&json!({"hidden": true})).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteSettings {
    pub(crate) methods: Option<MethodSet>,
    pub(crate) middleware: Vec<MiddlewareRef>,
    pub(crate) domain: Option<Vec<String>>,
    pub(crate) suffix: Option<Vec<String>>,
    pub(crate) pattern: Option<IndexMap<String, String>>,
    pub(crate) params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    #[serde(default, alias = "method")]
    methods: Option<OneOrMany>,
    #[serde(default)]
    middleware: Option<OneOrMany>,
    #[serde(default)]
    domain: Option<OneOrMany>,
    #[serde(default)]
    suffix: Option<OneOrMany>,
    #[serde(default)]
    pattern: Option<IndexMap<String, String>>,
    #[serde(default)]
    params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

impl RouteSettings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a declarative options object.
    ///
    /// Accepted keys: `methods` (or `method`), `middleware`, `domain`,
    /// `suffix`, `pattern` and `params`. List keys also accept one string.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown keys, wrongly typed values
    /// or unsupported method names.
    pub fn from_json(value: &Value) -> DispatchResult<Self> {
        let raw = RawSettings::deserialize(value)
            .map_err(|err| DispatchError::configuration(format!("invalid route options: {err}")))?;

        let methods = raw
            .methods
            .map(|m| MethodSet::from_tokens(m.into_vec()))
            .transpose()?;

        Ok(Self {
            methods,
            middleware: raw
                .middleware
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .map(MiddlewareRef::from)
                .collect(),
            domain: raw.domain.map(OneOrMany::into_vec),
            suffix: raw.suffix.map(OneOrMany::into_vec),
            pattern: raw.pattern,
            params: raw.params.unwrap_or_default(),
        })
    }

    /// Replaces the method set.
    pub fn methods(mut self, methods: impl Into<MethodSet>) -> Self {
        self.methods = Some(methods.into());
        self
    }

    /// Appends middleware.
    pub fn middleware<I, M>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.middleware.extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Replaces the accepted domains.
    pub fn domain<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain = Some(domains.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the accepted suffixes.
    pub fn suffix<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffix = Some(suffixes.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the variable patterns.
    pub fn pattern<I, K, V>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.pattern = Some(
            patterns
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Merges parameter rules.
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }
}
