//! # Switchyard Middleware
//!
//! Onion-style middleware pipeline for the Switchyard dispatcher.
//!
//! A pipeline wraps an ordered list of middleware around a terminal
//! [`Endpoint`](switchyard_core::Endpoint). The first middleware is the
//! outermost layer:
//!
//! ```text
//! ctx → global[0] → … → global[n] → route[0] → … → route[m] → endpoint
//!                                                                 ↓
//! reply ← global[0] ← … ← global[n] ← route[0] ← … ← route[m] ←───┘
//! ```
//!
//! Each middleware receives the request context and a single-use [`Next`]
//! continuation. It may short-circuit by returning without running `next`,
//! delegate by running it once, or post-process the reply it returns.
//! Failures propagate outward unchanged unless a layer chooses to handle them.
//!
//! Named middleware references are resolved through a [`MiddlewareRegistry`]
//! before first use; unknown names are configuration errors.

#![doc(html_root_url = "https://docs.rs/switchyard-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod pipeline;
pub mod registry;

pub use middleware::{middleware_fn, FnMiddleware, Middleware, Next};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use registry::{GlobalMiddleware, MiddlewareRef, MiddlewareRegistry};
