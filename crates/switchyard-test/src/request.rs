//! Test request types.

use http::{Method, Uri};
use serde::Serialize;
use serde_json::{Map, Value};
use switchyard_core::{RequestContext, RequestId};

use crate::error::TestError;

/// Host used when a request does not name one.
pub const DEFAULT_HOST: &str = "localhost";

/// A request descriptor ready to be dispatched.
#[derive(Debug, Clone)]
pub struct TestRequest {
    /// Request method.
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Host, possibly with a port.
    pub host: String,
    /// Initial parameter bag: decoded query pairs, then explicit params.
    pub params: Map<String, Value>,
    /// Fixed request ID, if any.
    pub request_id: Option<RequestId>,
}

impl TestRequest {
    /// Creates a GET request builder.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a POST request builder.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a PUT request builder.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a DELETE request builder.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Converts the request into a dispatch context.
    #[must_use]
    pub fn into_context(self) -> RequestContext {
        let ctx = RequestContext::new(self.method, self.host, self.path).with_params(self.params);
        match self.request_id {
            Some(id) => ctx.with_request_id(id),
            None => ctx,
        }
    }
}

/// Builder for [`TestRequest`].
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    host: Option<String>,
    default_host: String,
    params: Map<String, Value>,
    request_id: Option<RequestId>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a builder for `method` and `uri`.
    ///
    /// `uri` may be a path with a query (`/users?page=2`) or an absolute URI
    /// whose authority becomes the host.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            host: None,
            default_host: DEFAULT_HOST.to_string(),
            params: Map::new(),
            request_id: None,
            error: None,
        }
    }

    /// Sets the host, overriding any authority in the URI.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the host used when neither [`host`](Self::host) nor the URI names one.
    pub fn default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    /// Sets one parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Merges the fields of a serializable object into the parameters.
    ///
    /// Values that do not serialize to a JSON object make [`build`](Self::build) fail.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => self.params.extend(fields),
            Ok(other) => {
                self.error = Some(TestError::RequestBuild(format!(
                    "expected a JSON object, got {other}"
                )));
            }
            Err(e) => self.error = Some(TestError::Json(e)),
        }
        self
    }

    /// Fixes the request ID.
    pub fn request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`TestError`] for an unparsable URI or a rejected JSON body.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("Invalid URI: {e}")))?;

        let mut params = Map::new();
        if let Some(query) = uri.query() {
            for (name, value) in parse_query(query)? {
                params.insert(name, Value::String(value));
            }
        }
        params.extend(self.params);

        let host = self
            .host
            .or_else(|| uri.authority().map(ToString::to_string))
            .unwrap_or(self.default_host);

        Ok(TestRequest {
            method: self.method,
            path: uri.path().to_string(),
            host,
            params,
            request_id: self.request_id,
        })
    }
}

fn parse_query(query: &str) -> Result<Vec<(String, String)>, TestError> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode(name)?, decode(value)?))
        })
        .collect()
}

fn decode(component: &str) -> Result<String, TestError> {
    urlencoding::decode(&component.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| TestError::RequestBuild(format!("Invalid query encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let request = TestRequest::get("/users").build().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/users");
        assert_eq!(request.host, DEFAULT_HOST);
        assert!(request.params.is_empty());
    }

    #[test]
    fn test_query_decoded_into_params() {
        let request = TestRequest::get("/search?q=hello+world&tag=a%26b&flag")
            .build()
            .unwrap();
        assert_eq!(request.path, "/search");
        assert_eq!(request.params["q"], "hello world");
        assert_eq!(request.params["tag"], "a&b");
        assert_eq!(request.params["flag"], "");
    }

    #[test]
    fn test_explicit_params_override_query() {
        let request = TestRequest::get("/items?page=1")
            .param("page", 3)
            .build()
            .unwrap();
        assert_eq!(request.params["page"], 3);
    }

    #[test]
    fn test_absolute_uri_sets_host() {
        let request = TestRequest::get("http://api.example.com:8080/v1/users")
            .build()
            .unwrap();
        assert_eq!(request.host, "api.example.com:8080");
        assert_eq!(request.path, "/v1/users");

        let request = TestRequest::get("http://api.example.com/v1")
            .host("other.test")
            .build()
            .unwrap();
        assert_eq!(request.host, "other.test");

        let request = TestRequest::get("/v1")
            .default_host("fallback.test")
            .build()
            .unwrap();
        assert_eq!(request.host, "fallback.test");
    }

    #[test]
    fn test_json_object_merged() {
        let request = TestRequest::post("/users")
            .json(&json!({"name": "Alice", "age": 30}))
            .build()
            .unwrap();
        assert_eq!(request.params["name"], "Alice");
        assert_eq!(request.params["age"], 30);
    }

    #[test]
    fn test_json_non_object_rejected() {
        let result = TestRequest::post("/users").json(&[1, 2, 3]).build();
        assert!(matches!(result, Err(TestError::RequestBuild(_))));
    }

    #[test]
    fn test_into_context() {
        let id = RequestId::new();
        let ctx = TestRequest::delete("/users/7?soft=true")
            .host("example.com")
            .request_id(id)
            .build()
            .unwrap()
            .into_context();

        assert_eq!(ctx.method(), &Method::DELETE);
        assert_eq!(ctx.host(), "example.com");
        assert_eq!(ctx.path(), "/users/7");
        assert_eq!(ctx.param_str("soft"), Some("true"));
        assert_eq!(ctx.request_id(), id);
    }
}
