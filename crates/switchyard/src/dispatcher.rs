//! Request dispatch.
//!
//! A [`Dispatcher`] owns the frozen route table and the exception renderer.
//! For each request it:
//!
//! 1. matches `(path, method, host)` against the table;
//! 2. on a miss, calls the table's fallback endpoint with no middleware;
//! 3. on a hit, merges the path variables into the request parameters,
//!    records the [`MatchedRoute`] extension and runs the route pipeline
//!    (global middleware, then route middleware, then the handler);
//! 4. normalizes the reply into a response;
//! 5. renders any failure from steps 1 to 4 exactly once.

use std::sync::Arc;

use http::Method;
use serde_json::{Map, Value};
use switchyard_config::SwitchyardConfig;
use switchyard_core::{
    Controller, Controllers, DispatchResult, Endpoint, RequestContext, Response,
};
use switchyard_middleware::{Middleware, MiddlewareRef, MiddlewareRegistry};
use switchyard_router::{MatchedRoute, RouteCollector, RouteMatch, RouteTable, RouteTableBuilder};
use switchyard_telemetry::metrics::{self, Outcome};

use crate::config::router_policy;
use crate::render::{ExceptionRender, JsonExceptionRender};

/// Matches requests and runs them through their pipelines.
///
/// Built once at startup; dispatch only reads it, so one instance can be
/// shared across tasks.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use switchyard::prelude::*;
///
/// # tokio_test::block_on(async {
/// let dispatcher = Dispatcher::builder()
///     .routes(|r| {
///         r.get("/users/{id}", endpoint_fn(|ctx| Box::pin(async move {
///             let id = ctx.param_str("id").unwrap_or_default().to_string();
///             Ok(Reply::from(id))
///         })))
///         .pattern("id", r"\d+");
///     })
///     .build()
///     .unwrap();
///
/// let response = dispatcher
///     .dispatch_parts("/users/42", Default::default(), Method::GET, "localhost")
///     .await;
/// assert_eq!(response.status(), 200);
/// # });
/// ```
pub struct Dispatcher {
    table: RouteTable,
    render: Arc<dyn ExceptionRender>,
}

impl Dispatcher {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new(SwitchyardConfig::default())
    }

    /// Creates a builder with the given configuration.
    ///
    /// Router settings apply to routes registered afterwards, so the
    /// configuration is fixed before any route is added.
    #[must_use]
    pub fn with_config(config: SwitchyardConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    /// Returns the route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Matches a request without running anything.
    #[must_use]
    pub fn match_route(&self, path: &str, method: &Method, host: &str) -> RouteMatch<'_> {
        self.table.match_route(path, method, host)
    }

    /// Dispatches a request described by its parts.
    ///
    /// `params` seeds the parameter bag; path variables override entries of
    /// the same name.
    pub async fn dispatch_parts(
        &self,
        path: &str,
        params: Map<String, Value>,
        method: Method,
        host: &str,
    ) -> Response {
        let mut ctx = RequestContext::new(method, host, path).with_params(params);
        self.dispatch(&mut ctx).await
    }

    /// Dispatches one request, rendering any failure.
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> Response {
        let (result, matched) = self.run(ctx).await;
        let elapsed = ctx.elapsed();

        match result {
            Ok(response) => {
                let outcome = if matched { Outcome::Ok } else { Outcome::NotFound };
                metrics::record_dispatch(outcome, elapsed);
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.status_code = response.status().as_u16(),
                    duration_ms = elapsed.as_millis(),
                    "request dispatched"
                );
                response
            }
            Err(err) => {
                let status = err.status_code();
                if err.is_internal() || status.is_server_error() {
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        http.method = %ctx.method(),
                        http.path = %ctx.path(),
                        error = %err,
                        "request failed"
                    );
                } else {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        http.method = %ctx.method(),
                        http.path = %ctx.path(),
                        http.status_code = status.as_u16(),
                        error = %err,
                        "request rejected"
                    );
                }
                let response = self.render.render(err);
                let outcome = Outcome::from_status(response.status().as_u16());
                metrics::record_dispatch(outcome, elapsed);
                response
            }
        }
    }

    /// Dispatches one request, returning failures unrendered.
    pub async fn try_dispatch(&self, ctx: &mut RequestContext) -> DispatchResult<Response> {
        self.run(ctx).await.0
    }

    async fn run(&self, ctx: &mut RequestContext) -> (DispatchResult<Response>, bool) {
        let method = ctx.method().clone();
        let host = ctx.host().to_string();
        let path = ctx.path().to_string();

        match self.table.match_route(&path, &method, &host) {
            RouteMatch::Miss(fallback) => {
                let result = match fallback.call(ctx).await {
                    Ok(reply) => reply.into_response(),
                    Err(err) => Err(err),
                };
                (result, false)
            }
            RouteMatch::Found(found) => {
                ctx.merge_params(found.params());
                ctx.set_extension::<MatchedRoute>(found.info());

                let route = found.route();
                let result = match route.pipeline().execute(ctx, route.endpoint()).await {
                    Ok(reply) => reply.into_response(),
                    Err(err) => Err(err),
                };
                (result, true)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Collects routes, controllers and middleware, then builds a [`Dispatcher`].
pub struct DispatcherBuilder {
    config: SwitchyardConfig,
    routes: RouteCollector,
    controllers: Controllers,
    registry: MiddlewareRegistry,
    table: RouteTableBuilder,
    render: Option<Arc<dyn ExceptionRender>>,
}

impl DispatcherBuilder {
    /// Creates a builder; the router section of `config` shapes every route.
    #[must_use]
    pub fn new(config: SwitchyardConfig) -> Self {
        let routes = RouteCollector::new(router_policy(&config.router));
        let table =
            RouteTable::builder().not_found_message(config.dispatch.not_found_message.clone());
        Self {
            config,
            routes,
            controllers: Controllers::new(),
            registry: MiddlewareRegistry::new(),
            table,
            render: None,
        }
    }

    /// Registers routes.
    #[must_use]
    pub fn routes(mut self, register: impl FnOnce(&mut RouteCollector)) -> Self {
        register(&mut self.routes);
        self
    }

    /// Returns the route collector for direct registration.
    pub fn collector(&mut self) -> &mut RouteCollector {
        &mut self.routes
    }

    /// Registers a controller for `Target@action` handlers.
    #[must_use]
    pub fn controller(mut self, name: impl Into<String>, controller: impl Controller) -> Self {
        self.controllers.register(name, controller);
        self
    }

    /// Registers named middleware.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, name: impl Into<String>, middleware: M) -> Self {
        self.registry.register(name, middleware);
        self
    }

    /// Adds global middleware, run outside every route's own.
    #[must_use]
    pub fn global(mut self, middleware: impl Into<MiddlewareRef>) -> Self {
        self.table = self.table.global(middleware);
        self
    }

    /// Replaces the endpoint called when no route matches.
    #[must_use]
    pub fn fallback(mut self, endpoint: impl Endpoint) -> Self {
        self.table = self.table.fallback(endpoint);
        self
    }

    /// Replaces the exception renderer.
    #[must_use]
    pub fn render(mut self, render: impl ExceptionRender) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    /// Resolves every reference and freezes the route table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any malformed route, unknown
    /// controller, action or middleware, or invalid pattern.
    pub fn build(self) -> DispatchResult<Dispatcher> {
        let table = self
            .table
            .controllers(self.controllers)
            .registry(self.registry)
            .build(&self.routes)?;

        metrics::set_routes_registered(table.len());
        tracing::info!(routes = table.len(), "route table built");

        let render: Arc<dyn ExceptionRender> = match self.render {
            Some(render) => render,
            None => Arc::new(JsonExceptionRender::new(self.config.dispatch.debug)),
        };

        Ok(Dispatcher { table, render })
    }
}

impl std::fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("config", &self.config)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}
