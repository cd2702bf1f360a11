//! The route table and matcher.
//!
//! The table is built once from a [`RouteCollector`] and is read-only
//! afterwards. Building resolves every handler and middleware reference,
//! compiles every template, and composes one pipeline per route (global
//! middleware first), so a configuration mistake fails startup rather than
//! a request.
//!
//! # Matching
//!
//! 1. The request path is normalised. If suffix stripping is enabled and the
//!    last segment has an extension, the stem is matched with that suffix
//!    first; when nothing matches, the whole path is matched with no suffix.
//! 2. Literal templates are looked up by exact key, then variable templates
//!    are scanned. Within each group registration order decides.
//! 3. A candidate whose path matches must also accept the method, the host
//!    and the suffix. The first candidate passing all three wins.
//! 4. Otherwise the result is a miss carrying the not-found endpoint.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use smallvec::SmallVec;
use switchyard_core::{
    BoxFuture, Controllers, DispatchError, DispatchResult, Endpoint, Reply, RequestContext,
};
use switchyard_middleware::{GlobalMiddleware, MiddlewareRef, MiddlewareRegistry, Pipeline};

use crate::collector::RouteCollector;
use crate::params::Params;
use crate::policy::{domain_allows, normalize_path, split_suffix, suffix_allows, RouterPolicy};
use crate::route::RouteDefinition;
use crate::template::PathTemplate;

/// Message of the default not-found failure.
pub const NOT_FOUND_MESSAGE: &str = "routing resource not found";

/// A registered route with its resolved handler and pipeline.
pub struct Route {
    definition: Arc<RouteDefinition>,
    endpoint: Arc<dyn Endpoint>,
    pipeline: Pipeline,
}

impl Route {
    /// The frozen route options.
    #[must_use]
    pub fn definition(&self) -> &Arc<RouteDefinition> {
        &self.definition
    }

    /// The resolved terminal endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &dyn Endpoint {
        self.endpoint.as_ref()
    }

    /// Global middleware followed by the route's own.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn admits(&self, method: &Method, host: &str, suffix: Option<&str>) -> bool {
        let definition = &self.definition;
        definition.methods().allows(method)
            && domain_allows(definition.domains(), host)
            && suffix_allows(definition.suffixes(), suffix)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("paths", &self.definition.paths())
            .field("handler", self.definition.handler())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

/// Information about the matched route, stored in request extensions.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
    /// The matched route's options, including its parameter rules.
    pub definition: Arc<RouteDefinition>,
    /// The template that matched.
    pub template: String,
    /// The pseudo-static suffix of the request, if one was split off.
    pub suffix: Option<String>,
}

/// A successful match.
#[derive(Debug)]
pub struct Found<'a> {
    route: &'a Route,
    template: &'a str,
    params: Params,
    suffix: Option<String>,
}

impl<'a> Found<'a> {
    /// The matched route.
    #[must_use]
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// The template that matched.
    #[must_use]
    pub fn template(&self) -> &'a str {
        self.template
    }

    /// Variable bindings; empty for literal templates.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The suffix split from the request path.
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Returns the extension value describing this match.
    #[must_use]
    pub fn info(&self) -> MatchedRoute {
        MatchedRoute {
            definition: Arc::clone(&self.route.definition),
            template: self.template.to_string(),
            suffix: self.suffix.clone(),
        }
    }
}

/// The result of [`RouteTable::match_route`].
#[derive(Debug)]
pub enum RouteMatch<'a> {
    /// A route accepted the request.
    Found(Found<'a>),
    /// No route accepted the request. Carries the not-found endpoint.
    Miss(&'a dyn Endpoint),
}

impl<'a> RouteMatch<'a> {
    /// Returns `true` for a match.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the match, if any.
    #[must_use]
    pub fn found(&self) -> Option<&Found<'a>> {
        match self {
            Self::Found(found) => Some(found),
            Self::Miss(_) => None,
        }
    }
}

/// The default miss endpoint: fails with a not-found error.
struct NotFound {
    message: String,
}

impl Endpoint for NotFound {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>> {
        let err = DispatchError::route_not_found(
            self.message.clone(),
            ctx.method().as_str(),
            ctx.path(),
        );
        Box::pin(async move { Err(err) })
    }
}

struct Entry {
    route: usize,
    template: PathTemplate,
}

/// Indexed, read-only routes.
pub struct RouteTable {
    policy: Arc<RouterPolicy>,
    routes: Vec<Route>,
    entries: Vec<Entry>,
    literal: HashMap<String, SmallVec<[usize; 2]>>,
    variable: Vec<usize>,
    fallback: Arc<dyn Endpoint>,
}

impl RouteTable {
    /// Creates a table builder.
    #[must_use]
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Resolves a request to a route or a miss.
    ///
    /// # Example
    ///
    /// ```rust
    /// use http::Method;
    /// use switchyard_core::{endpoint_fn, Reply};
    /// use switchyard_router::{RouteCollector, RouteTable, RouterPolicy};
    ///
    /// let mut routes = RouteCollector::new(RouterPolicy::default());
    /// routes
    ///     .get("/users/{id}", endpoint_fn(|_ctx| Box::pin(async { Ok(Reply::empty()) })))
    ///     .pattern("id", r"\d+");
    ///
    /// let table = RouteTable::builder().build(&routes).unwrap();
    ///
    /// let hit = table.match_route("/users/42", &Method::GET, "localhost");
    /// assert_eq!(hit.found().unwrap().params().get("id"), Some("42"));
    ///
    /// assert!(!table.match_route("/users/abc", &Method::GET, "localhost").is_found());
    /// ```
    #[must_use]
    pub fn match_route(&self, path: &str, method: &Method, host: &str) -> RouteMatch<'_> {
        let path = normalize_path(path);

        if self.policy.strip_suffix {
            if let Some((stem, suffix)) = split_suffix(&path) {
                if let Some(found) = self.find(stem, Some(suffix), method, host) {
                    return RouteMatch::Found(found);
                }
            }
        }

        match self.find(&path, None, method, host) {
            Some(found) => RouteMatch::Found(found),
            None => {
                tracing::debug!(
                    http.method = %method,
                    http.path = %path,
                    host = %host,
                    "no route matched"
                );
                RouteMatch::Miss(self.fallback.as_ref())
            }
        }
    }

    fn find(
        &self,
        path: &str,
        suffix: Option<&str>,
        method: &Method,
        host: &str,
    ) -> Option<Found<'_>> {
        let key = if self.policy.case_sensitive {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(path.to_lowercase())
        };

        if let Some(ids) = self.literal.get(key.as_ref()) {
            for &id in ids {
                let entry = &self.entries[id];
                let route = &self.routes[entry.route];
                if route.admits(method, host, suffix) {
                    return Some(self.found(entry, Params::new(), suffix));
                }
            }
        }

        for &id in &self.variable {
            let entry = &self.entries[id];
            let Some(params) = entry.template.captures(path) else {
                continue;
            };
            if self.routes[entry.route].admits(method, host, suffix) {
                return Some(self.found(entry, params, suffix));
            }
        }

        None
    }

    fn found<'a>(&'a self, entry: &'a Entry, params: Params, suffix: Option<&str>) -> Found<'a> {
        Found {
            route: &self.routes[entry.route],
            template: entry.template.as_str(),
            params,
            suffix: suffix.map(str::to_string),
        }
    }

    /// Iterates route definitions in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter().map(|route| route.definition.as_ref())
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the matching policy.
    #[must_use]
    pub fn policy(&self) -> &RouterPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes)
            .field("literal", &self.literal.len())
            .field("variable", &self.variable.len())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`RouteTable`].
///
/// Carries what route references resolve against: controllers, named
/// middleware and the global middleware list.
pub struct RouteTableBuilder {
    controllers: Controllers,
    registry: MiddlewareRegistry,
    global: GlobalMiddleware,
    fallback: Option<Arc<dyn Endpoint>>,
    not_found_message: String,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self {
            controllers: Controllers::new(),
            registry: MiddlewareRegistry::new(),
            global: GlobalMiddleware::new(),
            fallback: None,
            not_found_message: NOT_FOUND_MESSAGE.to_string(),
        }
    }
}

impl RouteTableBuilder {
    /// Sets the controllers `Target@action` handlers resolve against.
    #[must_use]
    pub fn controllers(mut self, controllers: Controllers) -> Self {
        self.controllers = controllers;
        self
    }

    /// Sets the registry named middleware resolve against.
    #[must_use]
    pub fn registry(mut self, registry: MiddlewareRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Adds global middleware, run before every route's own.
    #[must_use]
    pub fn global(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.global.add(middleware);
        self
    }

    /// Replaces the endpoint invoked on a miss.
    #[must_use]
    pub fn fallback(mut self, endpoint: impl Endpoint) -> Self {
        self.fallback = Some(Arc::new(endpoint));
        self
    }

    /// Sets the message of the default not-found failure.
    #[must_use]
    pub fn not_found_message(mut self, message: impl Into<String>) -> Self {
        self.not_found_message = message.into();
        self
    }

    /// Builds the table from everything `collector` registered.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed route, an unresolvable
    /// handler or middleware reference, or an invalid variable pattern.
    pub fn build(mut self, collector: &RouteCollector) -> DispatchResult<RouteTable> {
        let policy = Arc::new(collector.policy().clone());
        let global = self.global.init(&mut self.registry)?;

        let mut routes = Vec::new();
        let mut entries = Vec::new();
        let mut literal: HashMap<String, SmallVec<[usize; 2]>> = HashMap::new();
        let mut variable = Vec::new();

        for definition in collector.definitions()? {
            let describe = definition.handler().describe();
            let endpoint = definition.handler().resolve(&self.controllers)?;
            let own = self
                .registry
                .resolve_all(definition.middleware())
                .map_err(|err| {
                    DispatchError::configuration(format!("route {describe}: {}", err.message()))
                })?;
            let pipeline = global.then(&own);

            let index = routes.len();
            for path in definition.paths() {
                let template =
                    PathTemplate::compile(path, definition.patterns(), policy.case_sensitive)?;
                tracing::debug!(
                    route = %path,
                    handler = %describe,
                    methods = ?definition.methods().tokens(),
                    middleware = ?pipeline.stage_names(),
                    "route registered"
                );

                let id = entries.len();
                if template.is_literal() {
                    literal
                        .entry(template.literal_key(policy.case_sensitive))
                        .or_default()
                        .push(id);
                } else {
                    variable.push(id);
                }
                entries.push(Entry {
                    route: index,
                    template,
                });
            }

            routes.push(Route {
                definition: Arc::new(definition),
                endpoint,
                pipeline,
            });
        }

        let fallback: Arc<dyn Endpoint> = match self.fallback {
            Some(endpoint) => endpoint,
            None => Arc::new(NotFound {
                message: self.not_found_message,
            }),
        };

        Ok(RouteTable {
            policy,
            routes,
            entries,
            literal,
            variable,
            fallback,
        })
    }
}

impl std::fmt::Debug for RouteTableBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTableBuilder")
            .field("controllers", &self.controllers)
            .field("registry", &self.registry)
            .field("global", &self.global)
            .finish_non_exhaustive()
    }
}
