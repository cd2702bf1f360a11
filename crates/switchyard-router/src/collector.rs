//! Route registration.
//!
//! A [`RouteCollector`] gathers route builders in registration order. It is
//! used during startup only; [`RouteTable`](crate::RouteTable) freezes what
//! it collected.

use std::sync::Arc;

use http::Method;
use switchyard_core::{DispatchError, DispatchResult};

use crate::handler::IntoHandler;
use crate::method::MethodSet;
use crate::policy::RouterPolicy;
use crate::route::{RouteBuilder, RouteDefinition, RouteState};
use crate::settings::RouteSettings;

/// Collects routes and groups.
///
/// # Example
///
/// ```rust
/// use switchyard_router::{RouteCollector, RouteSettings, RouterPolicy};
///
/// let mut routes = RouteCollector::new(RouterPolicy::default());
/// routes.get("/", "Home@index");
/// routes.group("/admin", RouteSettings::new().middleware(["Auth"]), |admin| {
///     admin.get("/users/{id}", "Users@show").pattern("id", r"\d+");
/// });
///
/// let definitions = routes.definitions().unwrap();
/// assert_eq!(definitions[1].paths(), ["/admin/users/{id}"]);
/// assert_eq!(definitions[1].middleware_names(), vec!["Auth"]);
/// ```
#[derive(Debug)]
pub struct RouteCollector {
    policy: Arc<RouterPolicy>,
    routes: Vec<RouteBuilder>,
    scopes: Vec<RouteState>,
}

impl RouteCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new(policy: RouterPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            routes: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Returns the matching policy.
    #[must_use]
    pub fn policy(&self) -> &RouterPolicy {
        &self.policy
    }

    fn parent_state(&self) -> RouteState {
        self.scopes
            .last()
            .cloned()
            .unwrap_or_else(|| RouteState::top_level(&self.policy))
    }

    /// Registers a route for one or more paths.
    ///
    /// The returned builder refines the route's options. A malformed
    /// handler is reported by [`definitions`](Self::definitions).
    pub fn register<P>(
        &mut self,
        paths: P,
        handler: impl IntoHandler,
        settings: RouteSettings,
    ) -> &mut RouteBuilder
    where
        P: RoutePaths,
    {
        let mut builder = RouteBuilder::with_parent(
            Arc::clone(&self.policy),
            self.parent_state(),
            paths.into_paths(),
            handler,
        );
        builder.settings(settings);
        self.routes.push(builder);
        let index = self.routes.len() - 1;
        &mut self.routes[index]
    }

    /// Registers routes inside a group.
    ///
    /// Every route registered by `routes` is prefixed with `prefix` and
    /// starts from the group's options.
    pub fn group<P, F>(&mut self, prefix: P, settings: RouteSettings, routes: F)
    where
        P: RoutePaths,
        F: FnOnce(&mut Self),
    {
        let mut state = self.parent_state();
        state.push_paths(prefix.into_paths(), self.policy.case_sensitive);
        state.apply(settings);

        self.scopes.push(state);
        routes(self);
        self.scopes.pop();
    }

    fn verb<P: RoutePaths>(
        &mut self,
        method: Method,
        path: P,
        handler: impl IntoHandler,
    ) -> &mut RouteBuilder {
        self.register(path, handler, RouteSettings::new().methods(method))
    }

    /// Registers a `GET` route.
    pub fn get<P: RoutePaths>(&mut self, path: P, handler: impl IntoHandler) -> &mut RouteBuilder {
        self.verb(Method::GET, path, handler)
    }

    /// Registers a `POST` route.
    pub fn post<P: RoutePaths>(&mut self, path: P, handler: impl IntoHandler) -> &mut RouteBuilder {
        self.verb(Method::POST, path, handler)
    }

    /// Registers a `PUT` route.
    pub fn put<P: RoutePaths>(&mut self, path: P, handler: impl IntoHandler) -> &mut RouteBuilder {
        self.verb(Method::PUT, path, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch<P: RoutePaths>(
        &mut self,
        path: P,
        handler: impl IntoHandler,
    ) -> &mut RouteBuilder {
        self.verb(Method::PATCH, path, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete<P: RoutePaths>(
        &mut self,
        path: P,
        handler: impl IntoHandler,
    ) -> &mut RouteBuilder {
        self.verb(Method::DELETE, path, handler)
    }

    /// Registers an `OPTIONS` route.
    pub fn options<P: RoutePaths>(
        &mut self,
        path: P,
        handler: impl IntoHandler,
    ) -> &mut RouteBuilder {
        self.verb(Method::OPTIONS, path, handler)
    }

    /// Registers a `HEAD` route.
    pub fn head<P: RoutePaths>(&mut self, path: P, handler: impl IntoHandler) -> &mut RouteBuilder {
        self.verb(Method::HEAD, path, handler)
    }

    /// Registers a route accepting any method.
    pub fn any<P: RoutePaths>(&mut self, path: P, handler: impl IntoHandler) -> &mut RouteBuilder {
        self.register(path, handler, RouteSettings::new().methods(MethodSet::Any))
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freezes every route in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first route's configuration error, prefixed with its
    /// registration index.
    pub fn definitions(&self) -> DispatchResult<Vec<RouteDefinition>> {
        self.routes
            .iter()
            .enumerate()
            .map(|(index, builder)| {
                builder.build().map_err(|err| {
                    DispatchError::configuration(format!("route #{index}: {}", err.message()))
                })
            })
            .collect()
    }
}

/// One path or a list of paths.
pub trait RoutePaths {
    /// Returns the paths.
    fn into_paths(self) -> Vec<String>;
}

impl RoutePaths for &str {
    fn into_paths(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl RoutePaths for String {
    fn into_paths(self) -> Vec<String> {
        vec![self]
    }
}

impl<const N: usize> RoutePaths for [&str; N] {
    fn into_paths(self) -> Vec<String> {
        self.iter().map(|p| (*p).to_string()).collect()
    }
}

impl RoutePaths for &[&str] {
    fn into_paths(self) -> Vec<String> {
        self.iter().map(|p| (*p).to_string()).collect()
    }
}

impl RoutePaths for Vec<String> {
    fn into_paths(self) -> Vec<String> {
        self
    }
}
