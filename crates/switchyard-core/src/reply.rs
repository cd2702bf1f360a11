//! Handler results and HTTP response types.
//!
//! Handlers and middleware produce a [`Reply`]. The dispatcher normalizes it
//! into a [`Response`]:
//!
//! | Reply | Response |
//! |---|---|
//! | `Reply::Response(r)` | `r`, unchanged |
//! | `Reply::Value(object or array)` | `application/json` body |
//! | `Reply::Value(string)` | `text/html` body, the string itself |
//! | `Reply::Value(number or bool)` | `text/html` body, its textual form |
//! | `Reply::Value(null)` | empty body |

use bytes::Bytes;
use http::{header, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchResult;

/// The HTTP response type produced by the dispatcher.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// The result value of a handler or middleware.
#[derive(Debug)]
pub enum Reply {
    /// A pre-built response, passed through unchanged.
    Response(Response),
    /// A value normalized by shape into a JSON or text response.
    Value(Value),
}

impl Reply {
    /// An empty reply.
    #[must_use]
    pub const fn empty() -> Self {
        Self::Value(Value::Null)
    }

    /// Serializes any value into a reply.
    pub fn json<T: Serialize>(value: &T) -> DispatchResult<Self> {
        Ok(Self::Value(serde_json::to_value(value)?))
    }

    /// Returns the inner value if this is not a pre-built response.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Response(_) => None,
        }
    }

    /// Returns `true` if this is a pre-built response.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    /// Normalizes the reply into a response.
    pub fn into_response(self) -> DispatchResult<Response> {
        match self {
            Self::Response(response) => Ok(response),
            Self::Value(value @ (Value::Object(_) | Value::Array(_))) => {
                let body = serde_json::to_vec(&value)?;
                Ok(Response::with_body(StatusCode::OK, "application/json", body))
            }
            Self::Value(Value::String(text)) => Ok(Response::with_body(
                StatusCode::OK,
                "text/html; charset=utf-8",
                text,
            )),
            Self::Value(Value::Null) => Ok(Response::with_body(
                StatusCode::OK,
                "text/html; charset=utf-8",
                Bytes::new(),
            )),
            Self::Value(scalar) => Ok(Response::with_body(
                StatusCode::OK,
                "text/html; charset=utf-8",
                scalar.to_string(),
            )),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::Value(Value::String(text.to_string()))
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Value(Value::String(text))
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a response with a status, content type and body.
    fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response;

    /// Creates a JSON response from an already-built value.
    fn json_value(status: StatusCode, value: &Value) -> Response;
}

impl ResponseExt for Response {
    fn with_body(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        if let Ok(value) = header::HeaderValue::from_str(content_type) {
            response.headers_mut().insert(header::CONTENT_TYPE, value);
        }
        response
    }

    fn json_value(status: StatusCode, value: &Value) -> Response {
        Self::with_body(status, "application/json", value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_object_becomes_json() {
        let response = Reply::from(json!({"id": 1})).into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_array_becomes_json() {
        let response = Reply::from(json!([1, 2])).into_response().unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, "[1,2]");
    }

    #[tokio::test]
    async fn test_string_becomes_text() {
        let response = Reply::from("ok").into_response().unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn test_scalar_is_coerced_to_text() {
        let response = Reply::from(json!(42)).into_response().unwrap();
        assert_eq!(body_string(response).await, "42");

        let response = Reply::from(json!(true)).into_response().unwrap();
        assert_eq!(body_string(response).await, "true");
    }

    #[tokio::test]
    async fn test_null_is_empty() {
        let response = Reply::empty().into_response().unwrap();
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_response_passes_through() {
        let prebuilt = Response::with_body(StatusCode::CREATED, "text/plain", "made");
        let reply = Reply::from(prebuilt);
        assert!(reply.is_response());

        let response = reply.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_string(response).await, "made");
    }

    #[test]
    fn test_json_serializes_structs() {
        #[derive(Serialize)]
        struct User {
            id: u32,
        }

        let reply = Reply::json(&User { id: 3 }).unwrap();
        assert_eq!(reply.as_value(), Some(&json!({"id": 3})));
    }
}
