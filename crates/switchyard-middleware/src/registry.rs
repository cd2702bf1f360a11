//! Middleware references and their one-time resolution.
//!
//! Routes and the global list refer to middleware either by name or by a
//! shared instance. Names are resolved through a [`MiddlewareRegistry`]
//! while the route table is built. A name is instantiated at most once and
//! the instance is shared by every route that names it.

use std::collections::HashMap;
use std::sync::Arc;

use switchyard_core::{DispatchError, DispatchResult};

use crate::middleware::Middleware;
use crate::pipeline::Pipeline;

type Factory = Box<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// A reference to a middleware, by name or by instance.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A name registered in a [`MiddlewareRegistry`].
    Named(String),
    /// An already constructed middleware.
    Instance(Arc<dyn Middleware>),
}

impl MiddlewareRef {
    /// Wraps a middleware value as a reference.
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::Instance(Arc::new(middleware))
    }

    /// Returns the name used in logs and error messages.
    #[must_use]
    pub fn describe(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Instance(middleware) => middleware.name(),
        }
    }

    /// Returns the registry name for named references.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Instance(_) => None,
        }
    }
}

impl std::fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Instance(middleware) => {
                f.debug_tuple("Instance").field(&middleware.name()).finish()
            }
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareRef {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        Self::Instance(middleware)
    }
}

/// Named middleware factories plus the instances created so far.
#[derive(Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, Factory>,
    initialized: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a middleware value under `name`.
    pub fn register<M: Middleware>(&mut self, name: impl Into<String>, middleware: M) {
        let shared: Arc<dyn Middleware> = Arc::new(middleware);
        self.register_with(name, move || Arc::clone(&shared));
    }

    /// Registers a factory invoked the first time `name` is resolved.
    pub fn register_with<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        let name = name.into();
        self.initialized.remove(&name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Returns `true` if a factory is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns `true` if `name` has already been instantiated.
    #[must_use]
    pub fn is_initialized(&self, name: &str) -> bool {
        self.initialized.contains_key(name)
    }

    /// Resolves a reference into a middleware instance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the reference if no middleware
    /// is registered under that name.
    pub fn resolve(&mut self, reference: &MiddlewareRef) -> DispatchResult<Arc<dyn Middleware>> {
        let name = match reference {
            MiddlewareRef::Instance(middleware) => return Ok(Arc::clone(middleware)),
            MiddlewareRef::Named(name) => name,
        };

        if let Some(existing) = self.initialized.get(name) {
            return Ok(Arc::clone(existing));
        }

        let factory = self.factories.get(name).ok_or_else(|| {
            DispatchError::configuration(format!(
                "middleware `{name}` is not registered as a middleware"
            ))
        })?;

        let instance = factory();
        tracing::debug!(middleware = %name, "middleware initialized");
        self.initialized.insert(name.clone(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Resolves a list of references into a pipeline, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first reference that cannot be resolved.
    pub fn resolve_all<'r, I>(&mut self, references: I) -> DispatchResult<Pipeline>
    where
        I: IntoIterator<Item = &'r MiddlewareRef>,
    {
        let stages = references
            .into_iter()
            .map(|reference| self.resolve(reference))
            .collect::<DispatchResult<Vec<_>>>()?;
        Ok(Pipeline::new(stages))
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("registered", &names)
            .field("initialized", &self.initialized.len())
            .finish()
    }
}

/// The process-wide middleware list run before every route's own.
#[derive(Debug, Default)]
pub struct GlobalMiddleware {
    refs: Vec<MiddlewareRef>,
    resolved: Option<Pipeline>,
}

impl GlobalMiddleware {
    /// Creates an empty global list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reference.
    ///
    /// A named reference that is already present is skipped and `false` is
    /// returned. Adding after [`init`](Self::init) invalidates the resolved
    /// pipeline.
    pub fn add(&mut self, reference: impl Into<MiddlewareRef>) -> bool {
        let reference = reference.into();
        if let Some(name) = reference.as_name() {
            if self.refs.iter().any(|r| r.as_name() == Some(name)) {
                tracing::debug!(middleware = %name, "global middleware already added");
                return false;
            }
        }
        self.refs.push(reference);
        self.resolved = None;
        true
    }

    /// Returns the references in registration order.
    #[must_use]
    pub fn refs(&self) -> &[MiddlewareRef] {
        &self.refs
    }

    /// Returns `true` once [`init`](Self::init) has succeeded.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.resolved.is_some()
    }

    /// Validates and resolves every reference.
    ///
    /// Repeated calls return the pipeline resolved by the first one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first unresolvable reference.
    pub fn init(&mut self, registry: &mut MiddlewareRegistry) -> DispatchResult<Pipeline> {
        if let Some(pipeline) = &self.resolved {
            return Ok(pipeline.clone());
        }
        let pipeline = registry.resolve_all(&self.refs)?;
        tracing::debug!(stages = ?pipeline.stage_names(), "global middleware initialized");
        self.resolved = Some(pipeline.clone());
        Ok(pipeline)
    }
}
