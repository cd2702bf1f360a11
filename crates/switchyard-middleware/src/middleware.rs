//! Core middleware trait and continuation.
//!
//! This module defines the [`Middleware`] capability and the [`Next`]
//! continuation handed to it.
//!
//! # Example
//!
//! ```
//! use switchyard_core::{BoxFuture, DispatchResult, Reply, RequestContext};
//! use switchyard_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RequestContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, DispatchResult<Reply>> {
//!         Box::pin(async move {
//!             let reply = next.run(ctx).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request handled");
//!             reply
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;

use switchyard_core::{BoxFuture, DispatchResult, Endpoint, Reply, RequestContext};

/// The middleware capability.
///
/// # Contract
///
/// - A middleware runs `next` at most once. [`Next::run`] consumes the
///   continuation, so a second call does not compile.
/// - Returning without running `next` short-circuits: no inner middleware
///   and no handler run.
/// - Errors from `next` should be returned unchanged unless the middleware
///   deliberately handles them.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware for logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Processes the request.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The mutable request context
    /// * `next` - Continuation invoking the rest of the chain
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult<Reply>>;
}

/// Continuation to the remainder of the chain.
///
/// A `Next` holds the middleware still to run and the terminal endpoint.
/// Running it invokes the first remaining middleware with a fresh `Next`
/// over the rest, or the endpoint once nothing remains. It is consumed by
/// [`Next::run`], which makes it single-use.
#[must_use = "a middleware that drops `next` short-circuits the chain"]
pub struct Next<'a> {
    remaining: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `remaining` ending in `endpoint`.
    pub(crate) fn new(remaining: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Endpoint) -> Self {
        Self {
            remaining,
            endpoint,
        }
    }

    /// Returns the number of middleware left before the endpoint.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Invokes the next middleware, or the endpoint if none remain.
    pub fn run<'b>(self, ctx: &'b mut RequestContext) -> BoxFuture<'b, DispatchResult<Reply>>
    where
        'a: 'b,
    {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                tracing::trace!(
                    request_id = %ctx.request_id(),
                    middleware = middleware.name(),
                    "entering middleware"
                );
                middleware.process(ctx, Next::new(rest, self.endpoint))
            }
            None => self.endpoint.call(ctx),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field(
                "remaining",
                &self.remaining.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// A middleware created from a closure.
///
/// Created with [`middleware_fn`].
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, DispatchResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, DispatchResult<Reply>> {
        (self.func)(ctx, next)
    }
}

/// Wraps a closure as a [`Middleware`].
///
/// # Example
///
/// ```
/// use switchyard_middleware::middleware_fn;
///
/// let tag = middleware_fn("tag", |ctx, next| {
///     Box::pin(async move {
///         ctx.set_param("tagged", true);
///         next.run(ctx).await
///     })
/// });
/// # let _ = tag;
/// ```
pub fn middleware_fn<F>(name: &'static str, func: F) -> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, DispatchResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    FnMiddleware { name, func }
}
