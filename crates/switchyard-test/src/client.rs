//! In-memory test client.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use switchyard::Dispatcher;

use crate::error::TestError;
use crate::request::{TestRequestBuilder, DEFAULT_HOST};
use crate::response::TestResponse;

/// Sends requests straight into a [`Dispatcher`], without a network.
///
/// # Example
///
/// ```rust
/// use switchyard::prelude::*;
/// use switchyard_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let dispatcher = Dispatcher::builder()
///     .routes(|r| {
///         r.get("/ping", endpoint_fn(|_ctx| Box::pin(async { Ok(Reply::from("pong")) })));
///     })
///     .build()
///     .unwrap();
///
/// let client = TestClient::new(dispatcher);
/// client.get("/ping").send().await.assert_status_code(200).assert_body_eq("pong");
/// client.get("/missing").send().await.assert_status_code(404);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
    default_host: String,
}

impl TestClient {
    /// Creates a client owning `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::from_arc(Arc::new(dispatcher))
    }

    /// Creates a client sharing `dispatcher`.
    #[must_use]
    pub fn from_arc(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            default_host: DEFAULT_HOST.to_string(),
        }
    }

    /// Sets the host used by requests that don't name one.
    #[must_use]
    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts an OPTIONS request.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }

    /// Starts a HEAD request.
    pub fn head(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest {
            client: self,
            builder: TestRequestBuilder::new(method, uri),
        }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets the host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.builder = self.builder.host(host);
        self
    }

    /// Sets one parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.builder = self.builder.param(name, value);
        self
    }

    /// Merges the fields of a serializable object into the parameters.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Dispatches the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should dispatch")
    }

    /// Dispatches the request, returning build and read failures.
    ///
    /// # Errors
    ///
    /// Returns [`TestError`] if the request is malformed or the body unreadable.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let mut ctx = self
            .builder
            .default_host(self.client.default_host.as_str())
            .build()?
            .into_context();
        let response = self.client.dispatcher.dispatch(&mut ctx).await;
        TestResponse::from_http(response).await
    }
}
