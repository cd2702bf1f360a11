//! Route handlers.
//!
//! A route handler is either an endpoint value or a `target` / `action`
//! pair naming a registered [`Controller`](switchyard_core::Controller)
//! action. Pairs are written `"Target@action"`, `"Target::action"` or as a
//! two-element sequence, and are resolved once when the table is built.

use std::sync::Arc;

use switchyard_core::{Controllers, DispatchError, DispatchResult, Endpoint, FnEndpoint};

/// A route's terminal handler.
#[derive(Clone)]
pub enum Handler {
    /// An endpoint invoked directly.
    Endpoint(Arc<dyn Endpoint>),
    /// A controller action resolved at build time.
    Action {
        /// Controller name.
        target: String,
        /// Action name on the controller.
        action: String,
    },
}

impl Handler {
    /// Wraps an endpoint value.
    pub fn endpoint(endpoint: impl Endpoint) -> Self {
        Self::Endpoint(Arc::new(endpoint))
    }

    /// Creates a controller action reference.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either part is empty.
    pub fn action(target: impl Into<String>, action: impl Into<String>) -> DispatchResult<Self> {
        let target = target.into();
        let action = action.into();
        if target.trim().is_empty() || action.trim().is_empty() {
            return Err(DispatchError::configuration(format!(
                "handler `{target}@{action}` needs both a target and an action"
            )));
        }
        Ok(Self::Action { target, action })
    }

    /// Parses `"Target@action"` or `"Target::action"`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for strings without exactly one
    /// separator or with an empty part.
    pub fn parse(spec: &str) -> DispatchResult<Self> {
        let parts = if spec.contains('@') {
            spec.split_once('@')
                .filter(|(_, action)| !action.contains('@'))
        } else {
            spec.split_once("::")
                .filter(|(_, action)| !action.contains("::"))
        };

        match parts {
            Some((target, action)) => Self::action(target, action),
            None => Err(DispatchError::configuration(format!(
                "handler `{spec}` must be `Target@action`, `Target::action` or [target, action]"
            ))),
        }
    }

    /// Builds an action from a `[target, action]` sequence.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless there are exactly two parts.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> DispatchResult<Self> {
        match parts {
            [target, action] => Self::action(target.as_ref(), action.as_ref()),
            _ => Err(DispatchError::configuration(format!(
                "handler sequence must have 2 elements, got {}",
                parts.len()
            ))),
        }
    }

    /// Returns a short description for logs and route listings.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Endpoint(_) => "<endpoint>".to_string(),
            Self::Action { target, action } => format!("{target}@{action}"),
        }
    }

    /// Resolves the handler into an invocable endpoint.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the handler if the controller
    /// or the action is not registered.
    pub fn resolve(&self, controllers: &Controllers) -> DispatchResult<Arc<dyn Endpoint>> {
        match self {
            Self::Endpoint(endpoint) => Ok(Arc::clone(endpoint)),
            Self::Action { target, action } => {
                if controllers.get(target).is_none() {
                    return Err(DispatchError::configuration(format!(
                        "handler `{target}@{action}`: controller `{target}` is not registered"
                    )));
                }
                controllers.resolve(target, action).ok_or_else(|| {
                    DispatchError::configuration(format!(
                        "handler `{target}@{action}`: controller has no action `{action}`"
                    ))
                })
            }
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Conversion into a [`Handler`], checked when the route is registered.
pub trait IntoHandler {
    /// Performs the conversion.
    fn into_handler(self) -> DispatchResult<Handler>;
}

impl IntoHandler for Handler {
    fn into_handler(self) -> DispatchResult<Handler> {
        Ok(self)
    }
}

impl IntoHandler for &str {
    fn into_handler(self) -> DispatchResult<Handler> {
        Handler::parse(self)
    }
}

impl IntoHandler for String {
    fn into_handler(self) -> DispatchResult<Handler> {
        Handler::parse(&self)
    }
}

impl<S: AsRef<str>> IntoHandler for [S; 2] {
    fn into_handler(self) -> DispatchResult<Handler> {
        Handler::from_parts(&self)
    }
}

impl<S: AsRef<str>> IntoHandler for &[S] {
    fn into_handler(self) -> DispatchResult<Handler> {
        Handler::from_parts(self)
    }
}

impl<S: AsRef<str>> IntoHandler for Vec<S> {
    fn into_handler(self) -> DispatchResult<Handler> {
        Handler::from_parts(&self)
    }
}

impl IntoHandler for Arc<dyn Endpoint> {
    fn into_handler(self) -> DispatchResult<Handler> {
        Ok(Handler::Endpoint(self))
    }
}

impl<F> IntoHandler for FnEndpoint<F>
where
    FnEndpoint<F>: Endpoint,
{
    fn into_handler(self) -> DispatchResult<Handler> {
        Ok(Handler::endpoint(self))
    }
}
