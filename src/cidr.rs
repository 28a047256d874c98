//! IPv4 CIDR value type
//!
//! The ordering/containment primitive for the prefix containment joins:
//! - Equality is exact over (address, prefix length); host bits matter
//! - Ordering: masked network asc, then full address asc, then length asc
//! - Containment is classic longest-match subnet containment
//! - Hash covers the masked network only

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::Ipv4Addr;

use thiserror::Error;

/// Result type for CIDR parsing
pub type CidrResult<T> = Result<T, CidrError>;

/// Errors raised while parsing a CIDR string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    /// Input is not of the form "A.B.C.D/LEN"
    #[error("invalid CIDR '{0}': expected A.B.C.D/LEN")]
    InvalidFormat(String),

    /// Prefix length outside 0..=32
    #[error("invalid CIDR '{0}': prefix length must be 0..=32")]
    InvalidPrefixLength(String),

    /// Strict parse rejected an address with host bits set
    #[error("invalid CIDR '{0}': host bits set in strict mode")]
    HostBitsSet(String),
}

/// An immutable IPv4 address + prefix-length pair.
///
/// `10.0.0.1/24` and `10.0.0.0/24` are distinct values with the same
/// network; sorting and containment operate on the masked network.
#[derive(Debug, Clone, Copy)]
pub struct Cidr {
    addr: u32,
    prefix_len: u8,
}

impl Cidr {
    /// Parse "A.B.C.D/LEN". With `strict`, the address must already be a
    /// network address (no host bits below the prefix length).
    pub fn parse(input: &str, strict: bool) -> CidrResult<Self> {
        let (addr_part, len_part) = input
            .split_once('/')
            .ok_or_else(|| CidrError::InvalidFormat(input.to_string()))?;

        let addr: Ipv4Addr = addr_part
            .parse()
            .map_err(|_| CidrError::InvalidFormat(input.to_string()))?;
        let prefix_len: u8 = len_part
            .parse()
            .map_err(|_| CidrError::InvalidFormat(input.to_string()))?;
        if prefix_len > 32 {
            return Err(CidrError::InvalidPrefixLength(input.to_string()));
        }

        let cidr = Self {
            addr: u32::from(addr),
            prefix_len,
        };
        if strict && cidr.addr != cidr.network_u32() {
            return Err(CidrError::HostBitsSet(input.to_string()));
        }
        Ok(cidr)
    }

    /// The network address (address masked by prefix length), dotted form
    pub fn network(&self) -> String {
        Ipv4Addr::from(self.network_u32()).to_string()
    }

    /// The unmasked address, dotted form
    pub fn address(&self) -> String {
        Ipv4Addr::from(self.addr).to_string()
    }

    /// The prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// True iff `other` lies inside this network: `other`'s network,
    /// re-masked to this prefix length, equals this network, and `other`
    /// is at least as specific. Covers the equal-network case.
    pub fn contains(&self, other: &Cidr) -> bool {
        other.prefix_len >= self.prefix_len
            && mask(other.network_u32(), self.prefix_len) == self.network_u32()
    }

    fn network_u32(&self) -> u32 {
        mask(self.addr, self.prefix_len)
    }
}

/// Mask a raw address down to `len` leading bits
fn mask(addr: u32, len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        addr & (u32::MAX << (32 - u32::from(len)))
    }
}

impl PartialEq for Cidr {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr && self.prefix_len == other.prefix_len
    }
}

impl Eq for Cidr {}

impl Ord for Cidr {
    /// Masked network asc, then full address asc, then prefix length asc.
    ///
    /// Reproduces: 10.0.0.0/23 < 10.0.0.0/24 < 10.0.0.1/23 < 10.0.0.1/24
    fn cmp(&self, other: &Self) -> Ordering {
        self.network_u32()
            .cmp(&other.network_u32())
            .then(self.addr.cmp(&other.addr))
            .then(self.prefix_len.cmp(&other.prefix_len))
    }
}

impl PartialOrd for Cidr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Cidr {
    /// Masked network only. Same-network values with different host bits
    /// or lengths may collide; equality still tells them apart.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.network_u32().hash(state);
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address(), self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> Cidr {
        Cidr::parse(s, false).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let c = cidr("10.0.0.1/24");
        assert_eq!(c.address(), "10.0.0.1");
        assert_eq!(c.network(), "10.0.0.0");
        assert_eq!(c.prefix_len(), 24);
        assert_eq!(c.to_string(), "10.0.0.1/24");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Cidr::parse("10.0.0.1", false),
            Err(CidrError::InvalidFormat(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0.0/24", false),
            Err(CidrError::InvalidFormat(_))
        ));
        assert!(matches!(
            Cidr::parse("10.0.0.1/33", false),
            Err(CidrError::InvalidPrefixLength(_))
        ));
    }

    #[test]
    fn test_strict_requires_network_address() {
        assert!(Cidr::parse("10.0.0.0/24", true).is_ok());
        assert!(matches!(
            Cidr::parse("10.0.0.1/24", true),
            Err(CidrError::HostBitsSet(_))
        ));
    }

    #[test]
    fn test_equality_is_exact() {
        assert_ne!(cidr("10.0.0.1/24"), cidr("10.0.0.0/24"));
        assert_eq!(cidr("10.0.0.1/24"), cidr("10.0.0.1/24"));
    }

    #[test]
    fn test_ordering() {
        let mut values = vec![
            cidr("10.0.0.0/24"),
            cidr("10.0.0.0/23"),
            cidr("10.0.0.1/24"),
            cidr("10.0.0.1/23"),
        ];
        values.sort();
        let sorted: Vec<String> = values.iter().map(Cidr::to_string).collect();
        assert_eq!(
            sorted,
            vec!["10.0.0.0/23", "10.0.0.0/24", "10.0.0.1/23", "10.0.0.1/24"]
        );
    }

    #[test]
    fn test_containment() {
        assert!(cidr("10.0.0.0/23").contains(&cidr("10.0.0.1/24")));
        assert!(!cidr("10.0.0.0/25").contains(&cidr("10.0.0.1/24")));
        // Equal network, equal length: contained
        assert!(cidr("10.0.0.0/24").contains(&cidr("10.0.0.0/24")));
        // Less specific is never contained in more specific
        assert!(!cidr("10.0.0.0/24").contains(&cidr("10.0.0.0/23")));
    }

    #[test]
    fn test_zero_length_contains_everything() {
        let all = cidr("0.0.0.0/0");
        assert!(all.contains(&cidr("255.255.255.255/32")));
        assert!(all.contains(&cidr("10.0.0.0/8")));
    }
}
