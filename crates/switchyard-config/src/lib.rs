//! Typed configuration for Switchyard.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use switchyard_config::ConfigLoader;
//!
//! # fn main() -> Result<(), switchyard_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_file("switchyard.toml")?
//!     .with_env_prefix("SWITCHYARD")
//!     .load()?;
//!
//! println!("strip suffix: {}", config.router.strip_suffix);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [router]
//! case_sensitive = false
//! default_pattern = '\w+'
//! suffix = ["*"]
//! domain = ["*"]
//! strip_suffix = true
//!
//! [dispatch]
//! debug = false
//! not_found_message = "routing resource not found"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `SWITCHYARD__ROUTER__SUFFIX=html,json`
//! - `SWITCHYARD__DISPATCH__DEBUG=true`
//! - `SWITCHYARD__LOGGING__LEVEL=debug`

#![doc(html_root_url = "https://docs.rs/switchyard-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::SwitchyardConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DispatchConfig, LogConfig, LogFormat, RouterConfig};
