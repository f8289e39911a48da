/* src/classifier.rs */

use tracing::debug;

use crate::context::{RequestContext, normalize_header_name};
use crate::registry::RangeRegistry;
use crate::resolver::AddressResolver;
use crate::validate::{is_valid_ipv4, parse_ipv4};

/// Headers only the edge is expected to set.
pub const DEFAULT_MARKER_HEADERS: [&str; 4] =
    ["cf-connecting-ip", "cf-ipcountry", "cf-ray", "cf-visitor"];

/// Header carrying the edge's view of the originating client.
pub const DEFAULT_CONNECTING_IP_HEADER: &str = "cf-connecting-ip";

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Address to report for the request, with markup stripped.
    pub reported_address: String,
    /// True when the peer is inside a trusted range and edge markers are present.
    pub is_trusted: bool,
    /// The resolver's candidate address, with markup stripped.
    pub peer_address: String,
    /// The edge-supplied client address, set only for trusted requests.
    pub connecting_ip: Option<String>,
}

impl ResolvedIdentity {
    /// An untrusted identity reporting `addr` as-is.
    pub fn untrusted(addr: &str) -> Self {
        let addr = strip_tags(addr);
        Self {
            reported_address: addr.clone(),
            is_trusted: false,
            peer_address: addr,
            connecting_ip: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.reported_address
    }
}

/// Decides whether a request came through the trusted edge.
///
/// Both signals must hold: the resolved peer address lies within the
/// [`RangeRegistry`], and at least one marker header is present. A trusted
/// request reports the edge's connecting-IP header instead of the peer.
///
/// Build one per application and share it (typically in an `Arc`); there is
/// no global instance.
///
/// ```rust
/// use edgeip::{Classifier, RequestInfo};
///
/// let classifier = Classifier::new();
/// let info = RequestInfo::default()
///     .with_remote_addr("173.245.48.1")
///     .with_header("CF-Ray", "7d1c2a3b4c5d6e7f-AMS")
///     .with_header("CF-Connecting-IP", "203.0.113.9");
///
/// let identity = classifier.classify(&info);
/// assert!(identity.is_trusted);
/// assert_eq!(identity.reported_address, "203.0.113.9");
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: RangeRegistry,
    resolver: AddressResolver,
    marker_headers: Vec<String>,
    connecting_ip_header: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            registry: RangeRegistry::default(),
            resolver: AddressResolver::default(),
            marker_headers: DEFAULT_MARKER_HEADERS.iter().map(|h| h.to_string()).collect(),
            connecting_ip_header: DEFAULT_CONNECTING_IP_HEADER.to_string(),
        }
    }
}

impl Classifier {
    /// Create a classifier with the default ranges and Cloudflare headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the range registry.
    pub fn with_registry(mut self, registry: RangeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the address resolver.
    pub fn with_resolver(mut self, resolver: AddressResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the marker headers, any of which signals the edge.
    pub fn with_marker_headers(mut self, headers: Vec<String>) -> Self {
        self.marker_headers = headers.iter().map(|h| normalize_header_name(h)).collect();
        self
    }

    /// Set the header holding the edge-supplied client address.
    pub fn with_connecting_ip_header(mut self, header: &str) -> Self {
        self.connecting_ip_header = normalize_header_name(header);
        self
    }

    pub fn registry(&self) -> &RangeRegistry {
        &self.registry
    }

    /// Mutable access for setup-time changes.
    pub fn registry_mut(&mut self) -> &mut RangeRegistry {
        &mut self.registry
    }

    /// Classify a request. Never fails.
    pub fn classify<C>(&self, ctx: &C) -> ResolvedIdentity
    where
        C: RequestContext + ?Sized,
    {
        let peer = self.resolver.resolve(ctx);
        let in_range = parse_ipv4(&peer).is_some_and(|addr| self.registry.contains(addr));
        let marker_present = self.marker_present(ctx);
        let is_trusted = in_range && marker_present;

        debug!(peer = ?peer, in_range, marker_present, is_trusted, "classified request");

        if !is_trusted {
            return ResolvedIdentity::untrusted(&peer);
        }

        // Trust is established but the edge may omit the connecting IP when
        // another marker triggered; keep reporting the peer then.
        let connecting_ip = ctx
            .header(&self.connecting_ip_header)
            .filter(|value| !value.is_empty())
            .map(strip_tags);
        let peer = strip_tags(&peer);

        ResolvedIdentity {
            reported_address: connecting_ip.clone().unwrap_or_else(|| peer.clone()),
            is_trusted,
            peer_address: peer,
            connecting_ip,
        }
    }

    /// The address to report for a request.
    pub fn ip<C>(&self, ctx: &C) -> String
    where
        C: RequestContext + ?Sized,
    {
        self.classify(ctx).reported_address
    }

    /// Whether the request came through the trusted edge.
    pub fn is_trusted<C>(&self, ctx: &C) -> bool
    where
        C: RequestContext + ?Sized,
    {
        self.classify(ctx).is_trusted
    }

    /// Validate `ip`, or the request's resolved address when `ip` is `None`.
    pub fn is_valid<C>(&self, ctx: &C, ip: Option<&str>) -> bool
    where
        C: RequestContext + ?Sized,
    {
        match ip.filter(|ip| !ip.is_empty()) {
            Some(ip) => is_valid_ipv4(ip),
            None => is_valid_ipv4(&self.resolver.resolve(ctx)),
        }
    }

    fn marker_present<C>(&self, ctx: &C) -> bool
    where
        C: RequestContext + ?Sized,
    {
        self.marker_headers.iter().any(|name| ctx.has_header(name))
    }
}

/// Remove tag-like markup (`<...>`) from `input`.
///
/// Everything from a `<` through the matching `>` is dropped, an unclosed
/// `<` drops the rest of the string, and NUL bytes are removed. Quoted `>`
/// inside a tag does not close it.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        if ch == '\0' {
            continue;
        }
        if !in_tag {
            if ch == '<' {
                in_tag = true;
            } else {
                out.push(ch);
            }
            continue;
        }
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '>') => in_tag = false,
            (None, _) => {}
        }
    }

    out
}
