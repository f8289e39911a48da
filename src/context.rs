/* src/context.rs */

use std::collections::HashMap;

/// Type alias for header maps. Keys are expected in normalized form, see
/// [`normalize_header_name`].
pub type HeaderMap = HashMap<String, String>;

/// Read-only view of an inbound request.
///
/// Implement this for your framework's request type, or build a
/// [`RequestInfo`] from the pieces you have.
pub trait RequestContext {
    /// The transport peer address as text, if the host knows it.
    fn peer_addr(&self) -> Option<&str>;

    /// Look up a header value by case-insensitive name.
    fn header(&self, name: &str) -> Option<&str>;

    /// Whether the header is present at all, even with an empty value.
    fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }
}

/// Normalize a header name to lowercase HTTP form.
///
/// CGI-style server variable names map onto the same key, so
/// `HTTP_CF_CONNECTING_IP`, `CF-Connecting-IP` and `cf-connecting-ip`
/// are all `cf-connecting-ip`.
pub fn normalize_header_name(name: &str) -> String {
    let lower = name.trim().to_ascii_lowercase();
    if !lower.contains('_') {
        return lower;
    }
    lower
        .strip_prefix("http_")
        .unwrap_or(lower.as_str())
        .replace('_', "-")
}

/// Owned request context: a header map plus the peer address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    headers: HeaderMap,
    remote_addr: Option<String>,
}

impl RequestInfo {
    /// Build from headers (any key casing) and an optional peer address.
    ///
    /// Keys that normalize to the same name are merged with `", "`, taking
    /// the original keys in sorted order.
    pub fn new(headers: HeaderMap, remote_addr: Option<String>) -> Self {
        let mut pairs: Vec<(String, String)> = headers.into_iter().collect();
        pairs.sort();

        let mut info = Self {
            headers: HashMap::new(),
            remote_addr,
        };
        for (name, value) in pairs {
            info.append_header(&name, value);
        }
        info
    }

    /// Build from CGI-style server variables.
    ///
    /// `REMOTE_ADDR` becomes the peer address and every `HTTP_*` variable
    /// becomes a header; anything else is ignored.
    ///
    /// ```rust
    /// use edgeip::{RequestContext, RequestInfo};
    ///
    /// let info = RequestInfo::from_server_vars([
    ///     ("REMOTE_ADDR", "173.245.48.1"),
    ///     ("HTTP_CF_RAY", "7d1c2a3b4c5d6e7f-AMS"),
    ///     ("SERVER_NAME", "example.com"),
    /// ]);
    /// assert_eq!(info.peer_addr(), Some("173.245.48.1"));
    /// assert!(info.has_header("CF-Ray"));
    /// assert!(!info.has_header("server-name"));
    /// ```
    pub fn from_server_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut info = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if key == "REMOTE_ADDR" {
                info.remote_addr = Some(value.into());
            } else if key.starts_with("HTTP_") {
                info.headers.insert(normalize_header_name(key), value.into());
            }
        }
        info
    }

    /// Set a header, replacing any previous value.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(normalize_header_name(name), value.into());
        self
    }

    /// Add a header value, joining it to any existing one with `", "` the way
    /// repeated header lines are folded.
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        self.headers
            .entry(normalize_header_name(name))
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
        self
    }

    /// Set the transport peer address.
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Remove a header if present.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&normalize_header_name(name))
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl RequestContext for RequestInfo {
    fn peer_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&normalize_header_name(name))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header_name() {
        assert_eq!(normalize_header_name("CF-Connecting-IP"), "cf-connecting-ip");
        assert_eq!(normalize_header_name("HTTP_CF_CONNECTING_IP"), "cf-connecting-ip");
        assert_eq!(normalize_header_name("HTTP_X_FORWARDED_FOR"), "x-forwarded-for");
        assert_eq!(normalize_header_name("Client-IP"), "client-ip");
        assert_eq!(normalize_header_name("http-version"), "http-version");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-Forwarded-For".to_string(), "198.51.100.1".to_string());
        let info = RequestInfo::new(headers, None);

        assert_eq!(info.header("x-forwarded-for"), Some("198.51.100.1"));
        assert_eq!(info.header("X-FORWARDED-FOR"), Some("198.51.100.1"));
        assert_eq!(info.header("HTTP_X_FORWARDED_FOR"), Some("198.51.100.1"));
        assert_eq!(info.peer_addr(), None);
    }

    #[test]
    fn test_colliding_keys_are_merged_in_order() {
        let mut headers = HashMap::new();
        headers.insert("x-forwarded-for".to_string(), "10.0.0.1".to_string());
        headers.insert("X_Forwarded_For".to_string(), "198.51.100.1".to_string());
        let info = RequestInfo::new(headers, None);

        assert_eq!(info.header("x-forwarded-for"), Some("198.51.100.1, 10.0.0.1"));
        assert_eq!(info.headers().len(), 1);
    }

    #[test]
    fn test_append_header_folds_values() {
        let mut info = RequestInfo::default();
        info.append_header("X-Forwarded-For", "198.51.100.1")
            .append_header("x-forwarded-for", "10.0.0.1")
            .append_header("CF-Ray", "");
        assert_eq!(info.header("x-forwarded-for"), Some("198.51.100.1, 10.0.0.1"));
        assert_eq!(info.header("cf-ray"), Some(""));
    }

    #[test]
    fn test_presence_includes_empty_values() {
        let info = RequestInfo::default().with_header("cf-visitor", "");
        assert!(info.has_header("cf-visitor"));
        assert!(!info.has_header("cf-ray"));
    }

    #[test]
    fn test_remove_header() {
        let mut info = RequestInfo::default()
            .with_header("Client-IP", "1.2.3.4")
            .with_remote_addr("9.9.9.9");
        assert_eq!(info.remove_header("client-ip"), Some("1.2.3.4".to_string()));
        assert!(info.headers().is_empty());
        assert_eq!(info.peer_addr(), Some("9.9.9.9"));
    }
}
