/* src/error.rs */

use thiserror::Error;

/// Result type alias for operations that may fail with `TrustError`.
pub type Result<T> = std::result::Result<T, TrustError>;

/// Errors raised while configuring the trusted range registry.
///
/// Classification itself never fails; malformed request data simply
/// produces an untrusted identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// A CIDR literal (or the input as a whole) was rejected.
    #[error("Invalid range input: {0} (expected a.b.c.d or a.b.c.d/prefix, e.g. 192.168.0.0/16)")]
    InvalidRangeInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_literal() {
        let err = TrustError::InvalidRangeInput("10.0.0.0/x".to_string());
        assert!(err.to_string().contains("10.0.0.0/x"));
    }
}
