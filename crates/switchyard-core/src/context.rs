//! Request context types.
//!
//! The [`RequestContext`] is the request descriptor handed to the dispatcher
//! and threaded by `&mut` through every middleware into the handler. It is
//! owned by the task serving the request and is never shared across tasks.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use switchyard_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request descriptor and mutable state.
///
/// Carries the request method, host and path used for matching, a mutable
/// parameter bag (query/body parameters supplied by the server, plus path
/// variables merged in by the dispatcher), and type-keyed extensions that
/// middleware can use to pass data inward.
///
/// # Example
///
/// ```
/// use switchyard_core::RequestContext;
/// use http::Method;
///
/// let mut ctx = RequestContext::new(Method::GET, "api.example.com", "/users/42");
/// ctx.set_param("id", "42");
///
/// assert_eq!(ctx.param_str("id"), Some("42"));
/// assert_eq!(ctx.host(), "api.example.com");
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// Request method.
    method: Method,

    /// Host header value, possibly including a port.
    host: String,

    /// Request path without the query string.
    path: String,

    /// Request parameter bag.
    params: Map<String, Value>,

    /// When the request started processing.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a new context for the given request descriptor.
    #[must_use]
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            host: host.into(),
            path: path.into(),
            params: Map::new(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Creates a `GET /` context on `localhost` for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(Method::GET, "localhost", "/")
    }

    /// Replaces the parameter bag.
    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Replaces the request ID, e.g. with one propagated by an upstream proxy.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw host, including any port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parameter bag.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns the parameter bag mutably.
    pub fn params_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.params
    }

    /// Returns a single parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Returns a single parameter if it is a string.
    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Sets a single parameter, replacing any previous value.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(name.into(), value.into());
    }

    /// Merges string bindings into the parameter bag.
    ///
    /// Bindings override existing parameters of the same name.
    pub fn merge_params<'a, I>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in bindings {
            self.params
                .insert(name.to_string(), Value::String(value.to_string()));
        }
    }

    /// Returns when the request started processing.
    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_core::RequestContext;
    ///
    /// struct UserId(u64);
    ///
    /// let mut ctx = RequestContext::mock();
    /// ctx.set_extension(UserId(7));
    /// assert_eq!(ctx.get_extension::<UserId>().map(|u| u.0), Some(7));
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_new_generates_unique_ids() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2, "Each RequestId should be unique");
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(id.to_string().len(), 36, "UUID string should be 36 characters");
    }

    #[test]
    fn test_context_descriptor() {
        let ctx = RequestContext::new(Method::POST, "example.com:8080", "/orders");
        assert_eq!(*ctx.method(), Method::POST);
        assert_eq!(ctx.host(), "example.com:8080");
        assert_eq!(ctx.path(), "/orders");
        assert!(ctx.params().is_empty());
    }

    #[test]
    fn test_merge_params_overrides_existing() {
        let mut ctx = RequestContext::mock();
        ctx.set_param("id", 1);
        ctx.set_param("page", 2);

        ctx.merge_params([("id", "42")]);

        assert_eq!(ctx.param_str("id"), Some("42"));
        assert_eq!(ctx.param("page"), Some(&Value::from(2)));
    }

    #[test]
    fn test_with_params() {
        let mut params = Map::new();
        params.insert("q".to_string(), Value::from("rust"));
        let ctx = RequestContext::mock().with_params(params);
        assert_eq!(ctx.param_str("q"), Some("rust"));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct MyExtension {
            value: i32,
        }

        let mut ctx = RequestContext::mock();
        assert!(!ctx.has_extension::<MyExtension>());

        ctx.set_extension(MyExtension { value: 42 });
        assert_eq!(ctx.get_extension::<MyExtension>(), Some(&MyExtension { value: 42 }));

        let removed = ctx.remove_extension::<MyExtension>();
        assert_eq!(removed, Some(MyExtension { value: 42 }));
        assert!(!ctx.has_extension::<MyExtension>());
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = RequestContext::mock();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(10));
    }
}
