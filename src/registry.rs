/* src/registry.rs */

use tracing::{debug, warn};

use crate::cidr::CidrRange;
use crate::error::{Result, TrustError};

/// Published IPv4 ranges of the Cloudflare edge, in their canonical order.
///
/// See <https://www.cloudflare.com/ips-v4>.
pub const DEFAULT_RANGES: [&str; 15] = [
    "199.27.128.0/21",
    "173.245.48.0/20",
    "103.21.244.0/22",
    "103.22.200.0/22",
    "103.31.4.0/22",
    "141.101.64.0/18",
    "108.162.192.0/18",
    "190.93.240.0/20",
    "188.114.96.0/20",
    "197.234.240.0/22",
    "198.41.128.0/17",
    "162.158.0.0/15",
    "104.16.0.0/12",
    "172.64.0.0/13",
    "131.0.72.0/22",
];

/// Input accepted by [`RangeRegistry::add`]: one literal or a sequence.
pub trait RangeInput {
    /// Flatten into the literal strings to validate.
    fn into_literals(self) -> Vec<String>;
}

impl RangeInput for &str {
    fn into_literals(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl RangeInput for String {
    fn into_literals(self) -> Vec<String> {
        vec![self]
    }
}

impl RangeInput for &String {
    fn into_literals(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<T: AsRef<str>> RangeInput for &[T] {
    fn into_literals(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<T: AsRef<str>> RangeInput for Vec<T> {
    fn into_literals(self) -> Vec<String> {
        self.as_slice().into_literals()
    }
}

impl<T: AsRef<str>, const N: usize> RangeInput for [T; N] {
    fn into_literals(self) -> Vec<String> {
        self.as_slice().into_literals()
    }
}

/// Ordered list of CIDR ranges owned by the trusted edge.
///
/// Mutation is meant for setup time. Once requests are being served the
/// registry should be read-only; share it behind an `Arc` and swap in a
/// rebuilt one to reconfigure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRegistry {
    entries: Vec<CidrRange>,
}

impl Default for RangeRegistry {
    /// Every literal in [`DEFAULT_RANGES`] is well-formed, so all of them load.
    fn default() -> Self {
        let entries: Vec<CidrRange> = DEFAULT_RANGES
            .iter()
            .filter_map(|literal| literal.parse().ok())
            .collect();
        debug_assert_eq!(entries.len(), DEFAULT_RANGES.len(), "malformed default range");
        Self { entries }
    }
}

impl RangeRegistry {
    /// Create a registry pre-populated with [`DEFAULT_RANGES`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create a registry holding exactly the given literals.
    pub fn from_literals(input: impl RangeInput) -> Result<Self> {
        let mut registry = Self::empty();
        registry.add(input)?;
        Ok(registry)
    }

    /// Discard every entry.
    pub fn clear(&mut self) -> &mut Self {
        debug!(discarded = self.entries.len(), "clearing trusted ranges");
        self.entries.clear();
        self
    }

    /// Append one or more CIDR literals.
    ///
    /// A bare address is taken as a `/32` host range. The whole input is
    /// validated before anything is written: an empty input or a single bad
    /// literal fails with [`TrustError::InvalidRangeInput`] and leaves the
    /// registry untouched.
    ///
    /// ```rust
    /// use edgeip::RangeRegistry;
    ///
    /// let mut registry = RangeRegistry::empty();
    /// registry.add("10.0.0.0/8")?.add(["192.0.2.1", "198.51.100.0/24"])?;
    /// assert_eq!(registry.len(), 3);
    ///
    /// assert!(registry.add(["203.0.113.0/24", "oops"]).is_err());
    /// assert_eq!(registry.len(), 3);
    /// # Ok::<(), edgeip::TrustError>(())
    /// ```
    pub fn add(&mut self, input: impl RangeInput) -> Result<&mut Self> {
        let literals = input.into_literals();
        if literals.is_empty() {
            warn!("rejected empty trusted range input");
            return Err(TrustError::InvalidRangeInput("empty input".to_string()));
        }

        let parsed = literals
            .iter()
            .map(|literal| literal.parse::<CidrRange>())
            .collect::<Result<Vec<_>>>()
            .inspect_err(|err| warn!(%err, "rejected trusted range input"))?;

        debug!(added = parsed.len(), "extending trusted ranges");
        self.entries.extend(parsed);
        Ok(self)
    }

    /// Whether any range is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registered ranges in insertion order.
    pub fn entries(&self) -> &[CidrRange] {
        &self.entries
    }

    /// Whether `addr` falls inside any registered range.
    ///
    /// Always false for an empty registry.
    pub fn contains(&self, addr: std::net::Ipv4Addr) -> bool {
        !self.is_empty() && self.entries.iter().any(|range| range.contains(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults_loaded_in_order() {
        let registry = RangeRegistry::new();
        assert_eq!(registry.len(), 15);
        let rendered: Vec<String> = registry.entries().iter().map(|r| r.to_string()).collect();
        assert_eq!(rendered, DEFAULT_RANGES);
    }

    #[test]
    fn test_default_literals_are_valid() {
        for literal in DEFAULT_RANGES {
            assert!(crate::validate::is_valid_cidr_literal(literal), "{literal}");
        }
    }

    #[test]
    fn test_default_membership() {
        let registry = RangeRegistry::new();
        assert!(registry.contains(ip("173.245.48.1")));
        assert!(registry.contains(ip("104.31.255.255")));
        assert!(registry.contains(ip("131.0.75.1")));
        assert!(!registry.contains(ip("8.8.8.8")));
        assert!(!registry.contains(ip("127.0.0.1")));
    }

    #[test]
    fn test_clear_then_nothing_contained() {
        let mut registry = RangeRegistry::new();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.entries().is_empty());
        assert!(!registry.contains(ip("173.245.48.1")));
        assert!(!registry.contains(ip("0.0.0.0")));
    }

    #[test]
    fn test_add_appends_after_existing() {
        let mut registry = RangeRegistry::new();
        registry.add("192.0.2.0/24").unwrap();
        assert_eq!(registry.len(), 16);
        assert_eq!(
            registry.entries().last(),
            Some(&CidrRange::new(ip("192.0.2.0"), 24).unwrap())
        );
        assert_eq!(registry.entries()[0].to_string(), DEFAULT_RANGES[0]);
    }

    #[test]
    fn test_add_bare_address_is_host_range() {
        let mut registry = RangeRegistry::empty();
        registry.add(String::from("192.0.2.7")).unwrap();
        assert_eq!(registry.entries(), &[CidrRange::host(ip("192.0.2.7"))]);
    }

    #[test]
    fn test_add_sequence_forms() {
        let mut registry = RangeRegistry::empty();
        let owned = vec!["10.0.0.0/8".to_string(), "172.16.0.0/12".to_string()];
        registry
            .add(owned)
            .unwrap()
            .add(&["192.168.0.0/16"][..])
            .unwrap()
            .add(["100.64.0.0/10"])
            .unwrap();
        let rendered: Vec<String> = registry.entries().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            rendered,
            ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "100.64.0.0/10"]
        );
    }

    #[test]
    fn test_add_is_atomic() {
        let mut registry = RangeRegistry::new();
        let before = registry.clone();

        assert_eq!(
            registry.add(["10.0.0.0/8", "10.0.0.0/abc"]).err(),
            Some(TrustError::InvalidRangeInput("10.0.0.0/abc".to_string()))
        );
        assert!(registry.add("not-an-ip").is_err());
        assert!(registry.add("").is_err());
        assert!(registry.add(Vec::<String>::new()).is_err());
        assert_eq!(registry, before);
    }

    #[test]
    fn test_from_literals() {
        let registry = RangeRegistry::from_literals(["0.0.0.0/0"]).unwrap();
        assert!(registry.contains(ip("8.8.8.8")));
        assert!(RangeRegistry::from_literals(Vec::<&str>::new()).is_err());
    }
}
