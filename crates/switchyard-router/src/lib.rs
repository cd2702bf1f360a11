//! # Switchyard Router
//!
//! Route definitions, registration and request matching.
//!
//! Routes are registered on a [`RouteCollector`], optionally inside nested
//! groups that contribute a path prefix and inherited options, and frozen
//! into a [`RouteTable`]. The table answers `(path, method, host)` with the
//! first route whose template, methods, domains and suffixes all accept the
//! request, or with a miss carrying the not-found endpoint.
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use switchyard_core::{endpoint_fn, Reply};
//! use switchyard_router::{RouteCollector, RouteSettings, RouteTable, RouterPolicy};
//!
//! let ok = || endpoint_fn(|_ctx| Box::pin(async { Ok(Reply::from("ok")) }));
//!
//! let mut routes = RouteCollector::new(RouterPolicy::default());
//! routes.get("/a", ok());
//! routes.get("/{any}", ok());
//! routes.group("/shop", RouteSettings::new().suffix(["html"]), |shop| {
//!     shop.get("/items/{id}", ok()).pattern("id", r"\d+");
//! });
//!
//! let table = RouteTable::builder().build(&routes).unwrap();
//!
//! let hit = table.match_route("/a", &Method::GET, "example.com");
//! assert_eq!(hit.found().unwrap().template(), "/a");
//!
//! let hit = table.match_route("/shop/items/7.html", &Method::GET, "example.com");
//! let found = hit.found().unwrap();
//! assert_eq!(found.params().get("id"), Some("7"));
//! assert_eq!(found.suffix(), Some("html"));
//! ```
//!
//! # Precedence
//!
//! Literal templates are tried before variable templates. Within each kind
//! the earlier registration wins; routes are never reordered by
//! specificity.

#![doc(html_root_url = "https://docs.rs/switchyard-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod collector;
mod handler;
mod method;
mod params;
pub mod policy;
mod route;
mod settings;
mod table;
pub mod template;

pub use collector::{RouteCollector, RoutePaths};
pub use handler::{Handler, IntoHandler};
pub use method::MethodSet;
pub use params::Params;
pub use policy::{RouterPolicy, DEFAULT_PATTERN};
pub use route::{RouteBuilder, RouteDefinition};
pub use settings::RouteSettings;
pub use table::{
    Found, MatchedRoute, Route, RouteMatch, RouteTable, RouteTableBuilder, NOT_FOUND_MESSAGE,
};
