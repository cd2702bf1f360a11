//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A dispatched response with its body already collected.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body cannot be collected.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE)
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("Invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        serde_json::from_slice(&self.body).map_err(TestError::Json)
    }

    /// Deserializes the body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not valid JSON.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Returns `errCode` from an error envelope body.
    #[must_use]
    pub fn err_code(&self) -> Option<i64> {
        self.json_value().ok()?.get("errCode")?.as_i64()
    }

    /// Returns `errMsg` from an error envelope body.
    #[must_use]
    pub fn err_msg(&self) -> Option<String> {
        self.json_value()
            .ok()?
            .get("errMsg")?
            .as_str()
            .map(ToString::to_string)
    }

    // Assertions

    /// Asserts the status.
    ///
    /// # Panics
    ///
    /// Panics if the status doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} with body {:?}",
            expected, self.status, self.body
        );
        self
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status doesn't match.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "Expected status {}, got {} with body {:?}",
            expected,
            self.status.as_u16(),
            self.body
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or doesn't match.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(
            actual, expected,
            "Header '{name}': expected '{expected}', got '{actual}'"
        );
        self
    }

    /// Asserts the body text.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't match.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().expect("Body should be valid UTF-8");
        assert_eq!(body, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts that a JSON field equals `expected`.
    ///
    /// `path` is dot separated; numeric segments index arrays (`items.0.id`).
    ///
    /// # Panics
    ///
    /// Panics if the field is missing or doesn't match.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &Value) -> &Self {
        let path = path.as_ref();
        let json = self.json_value().expect("Body should be valid JSON");
        let actual =
            json_path(&json, path).unwrap_or_else(|| panic!("JSON path '{path}' not found in: {json}"));
        assert_eq!(
            actual, expected,
            "JSON field '{path}': expected {expected}, got {actual}"
        );
        self
    }

    /// Asserts an error envelope with the given status and `errCode`.
    ///
    /// # Panics
    ///
    /// Panics if the status or the code doesn't match.
    pub fn assert_error(&self, status: StatusCode, err_code: i64) -> &Self {
        self.assert_status(status);
        assert_eq!(
            self.err_code(),
            Some(err_code),
            "Expected errCode {err_code} in {:?}",
            self.body
        );
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(segment)?,
        };
    }
    Some(current)
}
