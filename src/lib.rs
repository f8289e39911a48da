/* src/lib.rs */
//! # Edge IP
//!
//! Resolve the originating client address of an HTTP request that may have
//! passed through a trusted CDN edge (Cloudflare by default), and tell
//! whether it really did.
//!
//! A request is trusted when two independent signals agree:
//!
//! - the resolved peer address lies inside one of the edge's published
//!   IPv4 CIDR ranges, and
//! - at least one edge marker header (`CF-Connecting-IP`, `CF-IPCountry`,
//!   `CF-Ray`, `CF-Visitor`) is present.
//!
//! Trusted requests report the edge-supplied `CF-Connecting-IP`; all others
//! report the resolved address (`Client-IP`, then `X-Forwarded-For`, then the
//! transport peer). Reported addresses have tag markup stripped.
//!
//! ## Features
//!
//! - IPv4 CIDR registry with the default Cloudflare ranges and atomic `add`
//! - Framework-agnostic [`RequestContext`] trait
//! - Optional Axum middleware and extractor integration via the `axum` feature
//!
//! ## Examples
//!
//! ```rust
//! use edgeip::{Classifier, RangeRegistry, RequestInfo};
//!
//! let mut registry = RangeRegistry::new();
//! registry.add("192.0.2.0/24")?;
//! let classifier = Classifier::new().with_registry(registry);
//!
//! let info = RequestInfo::default()
//!     .with_remote_addr("192.0.2.10")
//!     .with_header("CF-Ray", "7d1c2a3b4c5d6e7f-AMS")
//!     .with_header("CF-Connecting-IP", "198.51.100.23");
//!
//! let identity = classifier.classify(&info);
//! assert!(identity.is_trusted);
//! assert_eq!(identity.reported_address, "198.51.100.23");
//! # Ok::<(), edgeip::TrustError>(())
//! ```

pub mod cidr;
pub mod classifier;
pub mod context;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod validate;

#[cfg(feature = "axum")]
pub mod middleware;

pub use cidr::CidrRange;
pub use classifier::{
    Classifier, DEFAULT_CONNECTING_IP_HEADER, DEFAULT_MARKER_HEADERS, ResolvedIdentity, strip_tags,
};
pub use context::{HeaderMap, RequestContext, RequestInfo, normalize_header_name};
pub use error::{Result, TrustError};
pub use registry::{DEFAULT_RANGES, RangeInput, RangeRegistry};
pub use resolver::{AddressResolver, resolve_address};
pub use validate::{in_range, is_valid_cidr_literal, is_valid_ipv4};

#[cfg(feature = "axum")]
pub use middleware::{TrustLayer, TrustService};

/// Re-export commonly used types
pub use std::net::Ipv4Addr;
