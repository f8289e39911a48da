/* src/validate.rs */

use std::net::Ipv4Addr;

use crate::cidr::CidrRange;

/// Parse strict dotted-decimal IPv4 syntax.
///
/// Exactly four decimal octets in `0..=255`. Octal-looking leading zeros,
/// hex octets, shortened forms (`127.1`) and surrounding whitespace are
/// all rejected.
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    s.parse::<Ipv4Addr>().ok()
}

/// Check whether `s` is a strictly formatted dotted-decimal IPv4 address.
///
/// ```rust
/// use edgeip::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("203.0.113.9"));
/// assert!(!is_valid_ipv4("203.0.113"));
/// assert!(!is_valid_ipv4("203.0.113.256"));
/// ```
pub fn is_valid_ipv4(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

/// Parse a prefix length: ASCII digits only, value in `0..=32`.
pub(crate) fn parse_prefix(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Digit strings too long for u8 are out of range anyway.
    s.parse::<u8>().ok().filter(|p| *p <= 32)
}

/// Check whether `s` is a CIDR literal (`a.b.c.d/p`).
///
/// The literal is split once on `/`; the address part must pass
/// [`is_valid_ipv4`] and the prefix part must be numeric and at most 32.
/// A bare address without a prefix is accepted as a `/32` host range.
pub fn is_valid_cidr_literal(s: &str) -> bool {
    match s.split_once('/') {
        Some((addr, prefix)) => is_valid_ipv4(addr) && parse_prefix(prefix).is_some(),
        None => is_valid_ipv4(s),
    }
}

/// Test whether `ip` lies inside `range`, both given as text.
///
/// A range without a `/prefix` is treated as `/32`. Anything that does not
/// parse is reported as not contained.
///
/// ```rust
/// use edgeip::in_range;
///
/// assert!(in_range("127.0.0.1", "127.0.0.1/24"));
/// assert!(in_range("10.1.2.3", "10.1.2.3"));
/// assert!(!in_range("10.1.2.4", "10.1.2.3"));
/// ```
pub fn in_range(ip: &str, range: &str) -> bool {
    match (parse_ipv4(ip), range.parse::<CidrRange>()) {
        (Some(ip), Ok(range)) => range.contains(ip),
        _ => false,
    }
}
