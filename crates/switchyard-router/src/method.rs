//! Route method sets.
//!
//! Routes accept the HTTP methods POST, GET, PUT, DELETE, PATCH, HEAD and
//! OPTIONS, or any method via the `ANY` / `*` wildcard.

use http::Method;
use switchyard_core::{DispatchError, DispatchResult};

/// The methods a route accepts.
///
/// # Example
///
/// ```rust
/// use switchyard_router::MethodSet;
/// use http::Method;
///
/// let set = MethodSet::only([Method::GET, Method::POST, Method::GET]);
/// assert!(set.allows(&Method::POST));
/// assert!(!set.allows(&Method::DELETE));
/// assert_eq!(set.tokens(), vec!["GET", "POST"]);
///
/// assert!(MethodSet::Any.allows(&Method::PATCH));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MethodSet {
    /// Matches every method.
    #[default]
    Any,
    /// Matches only the listed methods, deduplicated in first-seen order.
    Only(Vec<Method>),
}

impl MethodSet {
    /// Creates a set of the given methods, dropping duplicates.
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut unique: Vec<Method> = Vec::new();
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        Self::Only(unique)
    }

    /// Parses method tokens such as `"get"`, `"POST"`, `"ANY"` or `"*"`.
    ///
    /// A wildcard anywhere in the list makes the whole set [`MethodSet::Any`].
    pub fn from_tokens<I, S>(tokens: I) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut methods = Vec::new();
        for token in tokens {
            match parse_token(token.as_ref())? {
                Some(method) => methods.push(method),
                None => return Ok(Self::Any),
            }
        }
        Ok(Self::only(methods))
    }

    /// Returns `true` if the set accepts `method`.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }

    /// Returns `true` for the wildcard set.
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Returns the method tokens, `["*"]` for the wildcard.
    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Any => vec!["*"],
            Self::Only(methods) => methods.iter().map(Method::as_str).collect(),
        }
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        Self::Only(vec![method])
    }
}

/// Parses one token. `None` means the wildcard.
fn parse_token(token: &str) -> DispatchResult<Option<Method>> {
    let method = match token.trim().to_ascii_uppercase().as_str() {
        "*" | "ANY" => return Ok(None),
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "PATCH" => Method::PATCH,
        "HEAD" => Method::HEAD,
        "OPTIONS" => Method::OPTIONS,
        _ => {
            return Err(DispatchError::configuration(format!(
                "unsupported route method `{token}`"
            )))
        }
    };
    Ok(Some(method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_deduplicates_in_order() {
        let set = MethodSet::only([Method::PUT, Method::GET, Method::PUT]);
        assert_eq!(set, MethodSet::Only(vec![Method::PUT, Method::GET]));
    }

    #[test]
    fn test_from_tokens_case_insensitive() {
        let set = MethodSet::from_tokens(["get", "Post"]).unwrap();
        assert_eq!(set.tokens(), vec!["GET", "POST"]);
    }

    #[test]
    fn test_wildcard_token_wins() {
        assert!(MethodSet::from_tokens(["GET", "ANY"]).unwrap().is_any());
        assert!(MethodSet::from_tokens(["*"]).unwrap().is_any());
    }

    #[test]
    fn test_unknown_token_is_configuration_error() {
        let err = MethodSet::from_tokens(["FETCH"]).unwrap_err();
        assert!(err.message().contains("FETCH"));
    }

    #[test]
    fn test_empty_only_set_allows_nothing() {
        let set = MethodSet::only([]);
        assert!(!set.allows(&Method::GET));
    }
}
