//! Rendering of unhandled failures.
//!
//! The dispatcher hands every failure that escapes the pipeline to an
//! [`ExceptionRender`] exactly once. The default, [`JsonExceptionRender`],
//! produces the error envelope:
//!
//! ```json
//! { "errCode": 404, "errMsg": "routing resource not found", "data": null }
//! ```
//!
//! In debug mode `data` carries the source chain of internal failures; every
//! other failure sends `data: null`. Outside debug mode internal failures are
//! reported as `Internal Server Error`.

use http::StatusCode;
use serde_json::{json, Value};
use switchyard_core::{DispatchError, Response, ResponseExt};

/// Message shown for internal failures outside debug mode.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Turns a failure into a response.
pub trait ExceptionRender: Send + Sync + 'static {
    /// Renders `error`. Called once per failed dispatch.
    fn render(&self, error: DispatchError) -> Response;
}

/// Renders failures as a JSON envelope with the error's status.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExceptionRender {
    debug: bool,
}

impl JsonExceptionRender {
    /// Creates a renderer; `debug` exposes messages and traces of internal failures.
    #[must_use]
    pub const fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Builds the envelope body for `error`.
    #[must_use]
    pub fn envelope(&self, error: &DispatchError) -> Value {
        let message = if error.is_internal() && !self.debug {
            INTERNAL_ERROR_MESSAGE
        } else {
            error.message()
        };
        let data = if self.debug && error.is_internal() {
            json!(error.source_chain())
        } else {
            Value::Null
        };

        json!({
            "errCode": error.error_code(),
            "errMsg": message,
            "data": data,
        })
    }
}

impl ExceptionRender for JsonExceptionRender {
    fn render(&self, error: DispatchError) -> Response {
        let status = if error.is_internal() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            error.status_code()
        };

        let mut response = Response::json_value(status, &self.envelope(&error));
        if let Some(headers) = error.headers() {
            for (name, value) in headers {
                response.headers_mut().insert(name.clone(), value.clone());
            }
        }
        response
    }
}
