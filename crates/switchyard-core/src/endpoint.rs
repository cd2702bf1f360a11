//! Terminal handler capability.
//!
//! An [`Endpoint`] is what a route resolves to: the innermost step of the
//! middleware chain. Routes may reference an endpoint directly, or name a
//! `[target, action]` pair that is looked up in [`Controllers`] once, when
//! the route table is built. After that, invoking a handler is a single
//! indirect call.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::DispatchResult;
use crate::reply::Reply;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The terminal handler of a route.
///
/// # Example
///
/// ```
/// use switchyard_core::{BoxFuture, DispatchResult, Endpoint, Reply, RequestContext};
///
/// struct Hello;
///
/// impl Endpoint for Hello {
///     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>> {
///         Box::pin(async move { Ok(Reply::from(format!("hello {}", ctx.path()))) })
///     }
/// }
/// ```
pub trait Endpoint: Send + Sync + 'static {
    /// Handles the request.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>>;
}

impl<'a> std::fmt::Debug for dyn Endpoint + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Endpoint")
    }
}

/// An endpoint built from a closure.
///
/// Created with [`endpoint_fn`].
pub struct FnEndpoint<F> {
    func: F,
}

impl<F> std::fmt::Debug for FnEndpoint<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEndpoint").finish_non_exhaustive()
    }
}

impl<F> Endpoint for FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>> {
        (self.func)(ctx)
    }
}

/// Wraps a closure as an [`Endpoint`].
///
/// # Example
///
/// ```
/// use switchyard_core::{endpoint_fn, Reply};
///
/// let show = endpoint_fn(|ctx| {
///     Box::pin(async move {
///         let id = ctx.param_str("id").unwrap_or_default().to_string();
///         Ok(Reply::from(id))
///     })
/// });
/// # let _ = show;
/// ```
pub fn endpoint_fn<F>(func: F) -> FnEndpoint<F>
where
    F: for<'a> Fn(&'a mut RequestContext) -> BoxFuture<'a, DispatchResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    FnEndpoint { func }
}

/// A named handler target exposing actions.
///
/// This is the typed counterpart of a `"Target@action"` handler string.
/// Action lookup happens once per route at table build time.
pub trait Controller: Send + Sync + 'static {
    /// Returns the endpoint for the named action, if the controller has one.
    fn action(&self, name: &str) -> Option<Arc<dyn Endpoint>>;
}

/// Registry of controllers keyed by target name.
#[derive(Default, Clone)]
pub struct Controllers {
    targets: HashMap<String, Arc<dyn Controller>>,
}

impl std::fmt::Debug for Controllers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.targets.keys().collect();
        names.sort();
        f.debug_struct("Controllers").field("targets", &names).finish()
    }
}

impl Controllers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under a target name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, controller: impl Controller) {
        let name = name.into();
        if self.targets.contains_key(&name) {
            tracing::warn!(controller = %name, "replacing registered controller");
        }
        self.targets.insert(name, Arc::new(controller));
    }

    /// Returns the controller registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.targets.get(name)
    }

    /// Resolves `target` and `action` into an endpoint.
    #[must_use]
    pub fn resolve(&self, target: &str, action: &str) -> Option<Arc<dyn Endpoint>> {
        let endpoint = self.targets.get(target)?.action(action);
        if endpoint.is_none() {
            tracing::debug!(controller = %target, action = %action, "controller has no such action");
        }
        endpoint
    }

    /// Returns the number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns `true` if no controllers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Users;

    impl Controller for Users {
        fn action(&self, name: &str) -> Option<Arc<dyn Endpoint>> {
            match name {
                "index" => Some(Arc::new(endpoint_fn(|_ctx| {
                    Box::pin(async { Ok(Reply::from("all users")) })
                }))),
                _ => None,
            }
        }
    }

    #[tokio::test]
    async fn test_endpoint_fn_reads_context() {
        let endpoint = endpoint_fn(|ctx| {
            Box::pin(async move { Ok(Reply::from(ctx.path().to_string())) })
        });

        let mut ctx = RequestContext::mock();
        let reply = endpoint.call(&mut ctx).await.unwrap();
        assert_eq!(reply.as_value(), Some(&serde_json::json!("/")));
    }

    #[tokio::test]
    async fn test_controllers_resolve() {
        let mut controllers = Controllers::new();
        controllers.register("Users", Users);
        assert_eq!(controllers.len(), 1);

        let endpoint = controllers.resolve("Users", "index").unwrap();
        let mut ctx = RequestContext::mock();
        let reply = endpoint.call(&mut ctx).await.unwrap();
        assert_eq!(reply.as_value(), Some(&serde_json::json!("all users")));
    }

    #[test]
    fn test_controllers_unknown_target_or_action() {
        let mut controllers = Controllers::new();
        controllers.register("Users", Users);

        assert!(controllers.resolve("Users", "destroy").is_none());
        assert!(controllers.resolve("Posts", "index").is_none());
    }

    struct Empty;

    impl Controller for Empty {
        fn action(&self, _name: &str) -> Option<Arc<dyn Endpoint>> {
            None
        }
    }

    #[test]
    fn test_controllers_register_replaces() {
        let mut controllers = Controllers::new();
        controllers.register("Users", Users);
        controllers.register("Users", Empty);

        assert_eq!(controllers.len(), 1);
        assert!(controllers.resolve("Users", "index").is_none());
    }
}
