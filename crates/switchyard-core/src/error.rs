//! Error types for Switchyard.
//!
//! This module provides the [`DispatchError`] type, the single error type that
//! flows through route registration, the middleware chain and handlers.
//!
//! # Taxonomy
//!
//! | Variant | Raised | Status |
//! |---|---|---|
//! | `Configuration` | registration / table build | 500 |
//! | `RouteNotFound` | by the miss fallback endpoint | 404 |
//! | `ContractViolation` | pipeline build or first use | 500 |
//! | `Validation` | by external validators | 400 |
//! | `Http` | by handlers or middleware | any |
//! | `Internal` | by handlers or middleware | 500 |
//!
//! A route miss is a normal match result, not an error. The `RouteNotFound`
//! variant only appears once the miss fallback has been invoked.

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Coarse classification of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed route, handler or middleware configuration.
    Configuration,
    /// No route matched the request.
    RouteNotFound,
    /// A middleware broke the pipeline contract.
    ContractViolation,
    /// Request parameters failed validation.
    Validation,
    /// An explicit HTTP failure with its own status.
    Http,
    /// Any other runtime failure.
    Internal,
}

/// Standard error type for Switchyard.
///
/// # Example
///
/// ```
/// use switchyard_core::{DispatchError, ErrorKind};
///
/// fn load(id: &str) -> Result<(), DispatchError> {
///     if id.is_empty() {
///         return Err(DispatchError::validation("id cannot be empty"));
///     }
///     Ok(())
/// }
///
/// let err = load("").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert_eq!(err.status_code(), 400);
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Registration-time configuration error. Always fatal.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// No route matched.
    #[error("{message}")]
    RouteNotFound {
        /// Human-readable error message.
        message: String,
        /// The request method.
        method: String,
        /// The request path.
        path: String,
    },

    /// A middleware violated the pipeline contract.
    #[error("Middleware contract violation: {message}")]
    ContractViolation {
        /// Human-readable error message.
        message: String,
    },

    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// HTTP failure with an explicit status code and optional extra headers.
    #[error("{message}")]
    Http {
        /// HTTP status to respond with.
        status: StatusCode,
        /// Application error code.
        code: i64,
        /// Human-readable error message.
        message: String,
        /// Extra response headers.
        headers: HeaderMap,
    },

    /// Internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a route-not-found error for the given request.
    #[must_use]
    pub fn route_not_found(
        message: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::RouteNotFound {
            message: message.into(),
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates a middleware contract violation.
    #[must_use]
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an HTTP error. The application code defaults to the status code.
    #[must_use]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            code: i64::from(status.as_u16()),
            message: message.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Replaces the application code of an [`DispatchError::Http`] error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_code(mut self, new_code: i64) -> Self {
        if let Self::Http { code, .. } = &mut self {
            *code = new_code;
        }
        self
    }

    /// Adds a response header to an [`DispatchError::Http`] error.
    ///
    /// Invalid header names or values are ignored; other variants are
    /// returned unchanged.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Self::Http { headers, .. } = &mut self {
            if let (Ok(name), Ok(value)) = (
                http::HeaderName::try_from(name),
                http::HeaderValue::try_from(value),
            ) {
                headers.insert(name, value);
            }
        }
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::RouteNotFound { .. } => ErrorKind::RouteNotFound,
            Self::ContractViolation { .. } => ErrorKind::ContractViolation,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Http { .. } => ErrorKind::Http,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Http { status, .. } => *status,
            Self::Configuration { .. } | Self::ContractViolation { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the application error code rendered into error envelopes.
    ///
    /// Only [`DispatchError::Http`] carries its own code; every other variant
    /// reports its HTTP status, so there is no separate code space.
    #[must_use]
    pub fn error_code(&self) -> i64 {
        match self {
            Self::Http { code, .. } => *code,
            other => i64::from(other.status_code().as_u16()),
        }
    }

    /// Returns `true` if the message may leak implementation details and
    /// must be hidden outside debug mode.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::ContractViolation { .. } | Self::Internal { .. }
        )
    }

    /// Returns the extra headers carried by the error.
    #[must_use]
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Http { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns the client-facing message without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message }
            | Self::RouteNotFound { message, .. }
            | Self::ContractViolation { message }
            | Self::Validation { message }
            | Self::Http { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// Returns the error followed by every error in its source chain.
    ///
    /// Rendered as the trace of an error envelope in debug mode.
    #[must_use]
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            chain.push(err.to_string());
            current = err.source();
        }
        chain
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("failed to serialize response", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DispatchError::configuration("bad handler");
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.is_internal());
        assert!(error.to_string().contains("bad handler"));
    }

    #[test]
    fn test_route_not_found() {
        let error = DispatchError::route_not_found("routing resource not found", "GET", "/x");
        assert_eq!(error.kind(), ErrorKind::RouteNotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.error_code(), 404);
        assert!(!error.is_internal());
        assert_eq!(error.to_string(), "routing resource not found");
    }

    #[test]
    fn test_http_error_code_and_headers() {
        let error = DispatchError::http(StatusCode::TOO_MANY_REQUESTS, "slow down")
            .with_code(42)
            .with_header("retry-after", "30");

        assert_eq!(error.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(error.error_code(), 42);
        assert_eq!(error.headers().unwrap()["retry-after"], "30");
        assert_eq!(error.message(), "slow down");
    }

    #[test]
    fn test_with_code_ignored_for_other_variants() {
        let error = DispatchError::validation("nope").with_code(7);
        assert_eq!(error.error_code(), 400);
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let error = DispatchError::http(StatusCode::BAD_REQUEST, "x").with_header("bad name", "v");
        assert!(error.headers().unwrap().is_empty());
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let error = DispatchError::internal_with_source("save failed", io);

        let chain = error.source_chain();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].contains("save failed"));
        assert_eq!(chain[1], "disk gone");
    }

    #[test]
    fn test_from_anyhow() {
        let error: DispatchError = anyhow::anyhow!("boom").into();
        assert_eq!(error.kind(), ErrorKind::Internal);
        assert_eq!(error.message(), "boom");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::RouteNotFound).unwrap();
        assert_eq!(json, "\"route_not_found\"");
    }
}
