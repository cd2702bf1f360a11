//! Route definitions and their builder.
//!
//! A [`RouteBuilder`] accumulates options for one or more path templates
//! and freezes them into a [`RouteDefinition`]. Builders created inside a
//! group start from the group's options, so nesting composes:
//!
//! | Option | On a builder | From a parent group |
//! |---|---|---|
//! | paths | normalised | cross product with parent paths |
//! | methods | replaced, deduplicated | inherited |
//! | middleware | appended | inherited, runs first |
//! | domains, suffixes | replaced | inherited |
//! | patterns | replaced or set per variable | inherited |
//! | params | merged, later keys win | inherited |

use std::sync::Arc;

use http::Method;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use switchyard_core::{DispatchError, DispatchResult};
use switchyard_middleware::MiddlewareRef;

use crate::handler::{Handler, IntoHandler};
use crate::method::MethodSet;
use crate::policy::RouterPolicy;
use crate::settings::RouteSettings;
use crate::template::{join_paths, normalize_template, variables};

/// Options shared by groups and routes while they are being built.
#[derive(Debug, Clone)]
pub(crate) struct RouteState {
    pub(crate) paths: Option<Vec<String>>,
    pub(crate) methods: MethodSet,
    pub(crate) middleware: Vec<MiddlewareRef>,
    pub(crate) domains: Vec<String>,
    pub(crate) suffixes: Vec<String>,
    pub(crate) patterns: IndexMap<String, String>,
    pub(crate) params: Map<String, Value>,
}

impl RouteState {
    /// Options of a route registered outside any group.
    pub(crate) fn top_level(policy: &RouterPolicy) -> Self {
        Self {
            paths: None,
            methods: MethodSet::Any,
            middleware: Vec::new(),
            domains: policy.domain.clone(),
            suffixes: policy.suffix.clone(),
            patterns: IndexMap::new(),
            params: Map::new(),
        }
    }

    /// Normalises `paths` and prefixes them with any inherited paths.
    pub(crate) fn push_paths<I, S>(&mut self, paths: I, case_sensitive: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let own: Vec<String> = paths
            .into_iter()
            .map(|p| normalize_template(p.as_ref(), case_sensitive))
            .collect();

        self.paths = Some(match self.paths.take() {
            Some(parents) => parents
                .iter()
                .flat_map(|parent| own.iter().map(move |child| join_paths(parent, child)))
                .collect(),
            None => own,
        });
    }

    pub(crate) fn apply(&mut self, settings: RouteSettings) {
        if let Some(methods) = settings.methods {
            self.methods = methods;
        }
        self.middleware.extend(settings.middleware);
        if let Some(domains) = settings.domain {
            self.domains = domains;
        }
        if let Some(suffixes) = settings.suffix {
            self.suffixes = suffixes;
        }
        if let Some(patterns) = settings.pattern {
            self.patterns = patterns;
        }
        self.params.extend(settings.params);
    }
}

/// Builder for a [`RouteDefinition`].
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use switchyard_router::{RouteBuilder, RouterPolicy};
///
/// let route = RouteBuilder::new(RouterPolicy::default().into(), ["/Users/{id}/"], "Users@show")
///     .methods([Method::GET, Method::GET])
///     .pattern("id", r"\d+")
///     .middleware(["Auth"])
///     .middleware(["Log"])
///     .build()
///     .unwrap();
///
/// assert_eq!(route.paths(), ["/users/{id}"]);
/// assert_eq!(route.methods().tokens(), vec!["GET"]);
/// assert_eq!(route.middleware_names(), vec!["Auth", "Log"]);
/// assert_eq!(route.patterns()["id"], r"\d+");
/// ```
#[derive(Debug)]
pub struct RouteBuilder {
    policy: Arc<RouterPolicy>,
    state: RouteState,
    handler: Result<Handler, String>,
}

impl RouteBuilder {
    /// Creates a top-level route.
    pub fn new<I, S>(policy: Arc<RouterPolicy>, paths: I, handler: impl IntoHandler) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = RouteState::top_level(&policy);
        Self::with_parent(policy, state, paths, handler)
    }

    pub(crate) fn with_parent<I, S>(
        policy: Arc<RouterPolicy>,
        mut state: RouteState,
        paths: I,
        handler: impl IntoHandler,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        state.push_paths(paths, policy.case_sensitive);
        Self {
            policy,
            state,
            handler: handler
                .into_handler()
                .map_err(|err| err.message().to_string()),
        }
    }

    /// Restricts the route to the given methods, dropping duplicates.
    pub fn methods(&mut self, methods: impl IntoIterator<Item = Method>) -> &mut Self {
        self.state.methods = MethodSet::only(methods);
        self
    }

    /// Sets the method set directly.
    pub fn method_set(&mut self, methods: MethodSet) -> &mut Self {
        self.state.methods = methods;
        self
    }

    /// Accepts any method.
    pub fn any_method(&mut self) -> &mut Self {
        self.state.methods = MethodSet::Any;
        self
    }

    /// Appends middleware after any already present.
    pub fn middleware<I, M>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.state
            .middleware
            .extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Replaces the accepted domains.
    pub fn domains<I, S>(&mut self, domains: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the accepted suffixes.
    pub fn suffixes<I, S>(&mut self, suffixes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces all variable patterns.
    pub fn patterns<I, K, V>(&mut self, patterns: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.state.patterns = patterns
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Sets the pattern of one variable.
    pub fn pattern(&mut self, name: impl Into<String>, pattern: impl Into<String>) -> &mut Self {
        self.state.patterns.insert(name.into(), pattern.into());
        self
    }

    /// Merges parameter rules; later keys replace earlier ones.
    pub fn params(&mut self, params: Map<String, Value>) -> &mut Self {
        self.state.params.extend(params);
        self
    }

    /// Applies a batch of settings.
    pub fn settings(&mut self, settings: RouteSettings) -> &mut Self {
        self.state.apply(settings);
        self
    }

    /// Freezes the options into a definition.
    ///
    /// Every variable gets exactly one pattern: its own or inherited rule,
    /// else the configured default.
    ///
    /// # Errors
    ///
    /// Returns the configuration error recorded for a malformed handler, or
    /// one for a route without paths.
    pub fn build(&self) -> DispatchResult<RouteDefinition> {
        let handler = self
            .handler
            .clone()
            .map_err(DispatchError::configuration)?;
        let paths = match &self.state.paths {
            Some(paths) if !paths.is_empty() => paths.clone(),
            _ => {
                return Err(DispatchError::configuration(format!(
                    "route `{}` has no paths",
                    handler.describe()
                )))
            }
        };

        let mut patterns = IndexMap::new();
        for name in paths.iter().flat_map(|p| variables(p)) {
            let pattern = self
                .state
                .patterns
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.policy.default_pattern.clone());
            patterns.entry(name.to_string()).or_insert(pattern);
        }

        Ok(RouteDefinition {
            paths,
            handler,
            methods: self.state.methods.clone(),
            middleware: self.state.middleware.clone(),
            domains: self.state.domains.clone(),
            suffixes: self.state.suffixes.clone(),
            patterns,
            params: self.state.params.clone(),
        })
    }
}

/// The frozen options of a registered route.
///
/// Fields are read through accessors only; nothing changes a definition
/// after it is built.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    paths: Vec<String>,
    handler: Handler,
    methods: MethodSet,
    middleware: Vec<MiddlewareRef>,
    domains: Vec<String>,
    suffixes: Vec<String>,
    patterns: IndexMap<String, String>,
    params: Map<String, Value>,
}

impl RouteDefinition {
    /// Normalised path templates.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The handler reference.
    #[must_use]
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Accepted methods.
    #[must_use]
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Route middleware in execution order, group middleware first.
    #[must_use]
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Route middleware names in execution order.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&str> {
        self.middleware.iter().map(MiddlewareRef::describe).collect()
    }

    /// Accepted domains.
    #[must_use]
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Accepted suffixes.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// One pattern per variable, in order of first appearance.
    #[must_use]
    pub fn patterns(&self) -> &IndexMap<String, String> {
        &self.patterns
    }

    /// Parameter rules for external validators.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}
