/* src/resolver.rs */

use crate::context::{RequestContext, normalize_header_name};

/// Determines the candidate client address of a request.
///
/// Sources are consulted in order and the first non-empty one wins: each
/// configured header, then the transport peer address. Values are passed
/// through untouched. In particular a multi-hop `X-Forwarded-For` list is
/// not split.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    /// Headers to check, in order of preference.
    pub headers: Vec<String>,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self {
            headers: vec!["client-ip".to_string(), "x-forwarded-for".to_string()],
        }
    }
}

impl AddressResolver {
    /// Create a resolver with the default `Client-IP`, `X-Forwarded-For` chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the headers to check, in order of preference.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers.iter().map(|h| normalize_header_name(h)).collect();
        self
    }

    /// Resolve the raw candidate address.
    ///
    /// Returns an empty string when neither a header nor the peer address
    /// is available.
    pub fn resolve<C>(&self, ctx: &C) -> String
    where
        C: RequestContext + ?Sized,
    {
        self.headers
            .iter()
            .filter_map(|name| ctx.header(name))
            .chain(ctx.peer_addr())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Resolve a request's candidate address with the default precedence chain.
///
/// ```rust
/// use edgeip::{RequestInfo, resolve_address};
///
/// let info = RequestInfo::default()
///     .with_header("X-Forwarded-For", "198.51.100.7")
///     .with_remote_addr("10.0.0.2");
///
/// assert_eq!(resolve_address(&info), "198.51.100.7");
/// ```
pub fn resolve_address<C>(ctx: &C) -> String
where
    C: RequestContext + ?Sized,
{
    AddressResolver::default().resolve(ctx)
}
