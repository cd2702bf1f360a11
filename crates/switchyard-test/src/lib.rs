//! # Switchyard Test
//!
//! In-memory testing for Switchyard dispatchers. Requests go straight into
//! [`Dispatcher::dispatch`](switchyard::Dispatcher::dispatch), through the
//! full middleware pipeline and exception rendering, without a socket.
//!
//! - **Request builder**: method, path with query string, host, parameters
//! - **Response assertions**: status, headers, body text, JSON fields and
//!   error envelopes
//!
//! ## Example
//!
//! ```rust
//! use http::StatusCode;
//! use serde_json::json;
//! use switchyard::prelude::*;
//! use switchyard_test::TestClient;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = Dispatcher::builder()
//!     .routes(|r| {
//!         r.get("/users/{id}", endpoint_fn(|ctx| Box::pin(async move {
//!             Ok(Reply::Value(json!({ "id": ctx.param("id"), "page": ctx.param("page") })))
//!         })))
//!         .pattern("id", r"\d+");
//!     })
//!     .build()
//!     .unwrap();
//!
//! let client = TestClient::new(dispatcher);
//!
//! client
//!     .get("/users/7?page=2")
//!     .send()
//!     .await
//!     .assert_status(StatusCode::OK)
//!     .assert_json_field("id", &json!("7"))
//!     .assert_json_field("page", &json!("2"));
//!
//! client
//!     .get("/users/abc")
//!     .send()
//!     .await
//!     .assert_error(StatusCode::NOT_FOUND, 404);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder, DEFAULT_HOST};
pub use response::TestResponse;
