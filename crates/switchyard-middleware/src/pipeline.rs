//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] is an immutable, cheaply cloneable list of middleware.
//! Composing it with an endpoint yields the outermost [`Next`]; running
//! that continuation executes the whole onion for one request.
//!
//! The route table builds one pipeline per route at startup (global
//! middleware followed by the route's own), so no list is assembled on the
//! request path.

use std::sync::Arc;

use switchyard_core::{DispatchResult, Endpoint, Reply, RequestContext};

use crate::middleware::{Middleware, Next};

/// An immutable, ordered middleware list. Element 0 is the outermost layer.
///
/// # Example
///
/// ```
/// use switchyard_core::{endpoint_fn, Reply, RequestContext};
/// use switchyard_middleware::{middleware_fn, Pipeline};
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder()
///     .add(middleware_fn("noop", |ctx, next| next.run(ctx)))
///     .build();
///
/// let endpoint = endpoint_fn(|_ctx| Box::pin(async { Ok(Reply::from("ok")) }));
/// let mut ctx = RequestContext::mock();
///
/// let reply = pipeline.execute(&mut ctx, &endpoint).await.unwrap();
/// assert_eq!(reply.as_value().and_then(|v| v.as_str()), Some("ok"));
/// # });
/// ```
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Middleware>]>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Pipeline {
    /// Creates a pipeline from middleware in outermost-first order.
    #[must_use]
    pub fn new(stages: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Returns a pipeline running `self` outside `inner`.
    #[must_use]
    pub fn then(&self, inner: &Pipeline) -> Self {
        Self::new(self.stages.iter().chain(inner.stages.iter()).cloned())
    }

    /// Composes the pipeline around `endpoint`, returning the entry point.
    pub fn compose<'a>(&'a self, endpoint: &'a dyn Endpoint) -> Next<'a> {
        Next::new(&self.stages, endpoint)
    }

    /// Runs the pipeline for one request.
    pub async fn execute(
        &self,
        ctx: &mut RequestContext,
        endpoint: &dyn Endpoint,
    ) -> DispatchResult<Reply> {
        self.compose(endpoint).run(ctx).await
    }

    /// Returns the middleware names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Returns the number of middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the pipeline has no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware as the innermost layer so far.
    #[must_use]
    pub fn add<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared middleware.
    #[must_use]
    pub fn add_shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline::new(self.stages)
    }
}
