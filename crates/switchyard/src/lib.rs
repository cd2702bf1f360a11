//! # Switchyard
//!
//! HTTP request dispatch: route matching, onion middleware and error
//! rendering, independent of any server.
//!
//! ```text
//! request ─► RouteTable ─► miss ──────────────► fallback ─┐
//!                 │                                         │
//!                 └─► hit ─► global mw ─► route mw ─► handler
//!                                                           │
//! response ◄── normalize reply ◄── ExceptionRender on error ◄┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use switchyard::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = Dispatcher::builder()
//!     .middleware("auth", middleware_fn("auth", |ctx, next| {
//!         Box::pin(async move {
//!             if ctx.host().starts_with("internal.") {
//!                 next.run(ctx).await
//!             } else {
//!                 Err(DispatchError::http(http::StatusCode::FORBIDDEN, "forbidden"))
//!             }
//!         })
//!     }))
//!     .routes(|r| {
//!         r.group("/admin", RouteSettings::new().middleware(["auth"]), |admin| {
//!             admin.get("/stats", endpoint_fn(|_ctx| Box::pin(async {
//!                 Ok(Reply::from(serde_json::json!({"routes": 1})))
//!             })));
//!         });
//!     })
//!     .build()
//!     .unwrap();
//!
//! let ok = dispatcher
//!     .dispatch_parts("/admin/stats", Default::default(), Method::GET, "internal.example.com")
//!     .await;
//! assert_eq!(ok.status(), 200);
//!
//! let denied = dispatcher
//!     .dispatch_parts("/admin/stats", Default::default(), Method::GET, "example.com")
//!     .await;
//! assert_eq!(denied.status(), 403);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/switchyard/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
mod dispatcher;
pub mod render;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use render::{ExceptionRender, JsonExceptionRender};

pub use switchyard_config as settings;
pub use switchyard_core as core;
pub use switchyard_middleware as middleware;
pub use switchyard_router as router;
pub use switchyard_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```rust
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Dispatcher, DispatcherBuilder, ExceptionRender, JsonExceptionRender};

    pub use switchyard_config::{ConfigLoader, SwitchyardConfig};

    pub use switchyard_core::{
        endpoint_fn, BoxFuture, Controller, Controllers, DispatchError, DispatchResult, Endpoint,
        ErrorKind, Reply, RequestContext, Response, ResponseExt,
    };

    pub use switchyard_middleware::{middleware_fn, Middleware, MiddlewareRef, Next};

    pub use switchyard_router::{
        Handler, MatchedRoute, MethodSet, RouteCollector, RouteMatch, RouteSettings, RouteTable,
        RouterPolicy,
    };
}
