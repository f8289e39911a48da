/* src/cidr.rs */

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::TrustError;
use crate::validate::{parse_ipv4, parse_prefix};

/// A single IPv4 CIDR block, `base/prefix_len`.
///
/// Only the top `prefix_len` bits of `base` are significant. The base is
/// stored as written; host bits are masked away when testing containment,
/// so `10.1.2.3/8` and `10.0.0.0/8` describe the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrRange {
    base: Ipv4Addr,
    prefix_len: u8,
}

impl CidrRange {
    /// Build a range from its parts. Returns `None` if `prefix_len > 32`.
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Option<Self> {
        (prefix_len <= 32).then_some(Self { base, prefix_len })
    }

    /// A single-host `/32` range.
    pub fn host(addr: Ipv4Addr) -> Self {
        Self {
            base: addr,
            prefix_len: 32,
        }
    }

    pub fn base(&self) -> Ipv4Addr {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Network mask derived from the prefix length.
    ///
    /// A `/0` range yields a zero mask, so it matches every address.
    pub fn netmask(&self) -> u32 {
        // 2^(32 - p) - 1 needs 33 bits when p == 0.
        let wildcard = ((1u64 << (32 - u32::from(self.prefix_len))) - 1) as u32;
        !wildcard
    }

    /// Test whether `candidate` falls inside this range.
    pub fn contains(&self, candidate: Ipv4Addr) -> bool {
        let mask = self.netmask();
        (u32::from(candidate) & mask) == (u32::from(self.base) & mask)
    }
}

impl FromStr for CidrRange {
    type Err = TrustError;

    /// Parse `a.b.c.d/p`, or a bare `a.b.c.d` as `/32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrustError::InvalidRangeInput(s.to_string());

        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, parse_prefix(prefix).ok_or_else(invalid)?),
            None => (s, 32),
        };
        let base = parse_ipv4(addr).ok_or_else(invalid)?;

        Ok(Self {
            base,
            prefix_len: prefix,
        })
    }
}

impl fmt::Display for CidrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn test_contains_inside_and_outside() {
        let range: CidrRange = "173.245.48.0/20".parse().unwrap();
        assert!(range.contains(ip("173.245.48.1")));
        assert!(range.contains(ip("173.245.63.255")));
        assert!(!range.contains(ip("173.245.64.0")));
        assert!(!range.contains(ip("8.8.8.8")));
    }

    #[test]
    fn test_host_range_matches_only_itself() {
        for p in 0..=32u8 {
            let a = Ipv4Addr::from(0xC633_7109u32.rotate_left(u32::from(p)));
            assert!(CidrRange::host(a).contains(a));
            assert!(!CidrRange::host(a).contains(Ipv4Addr::from(u32::from(a) ^ 1)));
        }
    }

    #[test]
    fn test_zero_prefix_matches_everything() {
        let range = CidrRange::new(ip("203.0.113.9"), 0).unwrap();
        assert_eq!(range.netmask(), 0);
        for candidate in ["0.0.0.0", "8.8.8.8", "255.255.255.255", "10.0.0.1"] {
            assert!(range.contains(ip(candidate)));
        }
    }

    #[test]
    fn test_netmask_values() {
        assert_eq!("1.2.3.4/32".parse::<CidrRange>().unwrap().netmask(), u32::MAX);
        assert_eq!("1.2.3.4/24".parse::<CidrRange>().unwrap().netmask(), 0xFFFF_FF00);
        assert_eq!("1.2.3.4/1".parse::<CidrRange>().unwrap().netmask(), 0x8000_0000);
    }

    #[test]
    fn test_host_bits_in_base_are_ignored() {
        let range: CidrRange = "10.1.2.3/8".parse().unwrap();
        assert!(range.contains(ip("10.200.0.1")));
        assert_eq!(range.to_string(), "10.1.2.3/8");
    }

    #[test]
    fn test_parse_bare_address_defaults_to_host() {
        let range: CidrRange = "192.0.2.7".parse().unwrap();
        assert_eq!(range.prefix_len(), 32);
        assert_eq!(range.base(), ip("192.0.2.7"));
    }

    #[test]
    fn test_parse_rejects_bad_literals() {
        for bad in ["", "/24", "192.0.2.0/", "192.0.2.0/33", "192.0.2/24", "x/1"] {
            assert_eq!(
                bad.parse::<CidrRange>(),
                Err(TrustError::InvalidRangeInput(bad.to_string()))
            );
        }
        assert!(CidrRange::new(ip("1.1.1.1"), 33).is_none());
    }
}
