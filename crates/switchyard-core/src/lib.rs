//! # Switchyard Core
//!
//! Core types and traits shared by every Switchyard crate.
//!
//! This crate provides the foundational types used throughout the dispatcher:
//!
//! - [`RequestContext`] - Per-request descriptor (method, host, path) plus the mutable parameter bag
//! - [`RequestId`] - UUID v7 request identifier
//! - [`DispatchError`] - The error taxonomy shared by routing, middleware and handlers
//! - [`Reply`] - The value a handler or middleware produces before normalization
//! - [`Endpoint`] - The terminal handler capability
//! - [`Controller`] / [`Controllers`] - Named targets for `"Target@action"` handlers

#![doc(html_root_url = "https://docs.rs/switchyard-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod endpoint;
mod error;
mod reply;

pub use context::{RequestContext, RequestId};
pub use endpoint::{endpoint_fn, BoxFuture, Controller, Controllers, Endpoint, FnEndpoint};
pub use error::{DispatchError, DispatchResult, ErrorKind};
pub use reply::{Reply, Response, ResponseExt};
