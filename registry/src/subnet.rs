use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CIDR-style network address range used as the ban key.
///
/// Host bits are zeroed on construction, so two subnets compare equal
/// whenever they describe the same range.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Subnet {
    addr: IpAddr,
    prefix_len: u8,
}

impl Subnet {
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self, SubnetParseError> {
        let addr = match addr {
            IpAddr::V4(v4) => {
                if prefix_len > 32 {
                    return Err(SubnetParseError::InvalidPrefixLen(prefix_len));
                }
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & mask_v4(prefix_len)))
            }
            IpAddr::V6(v6) => {
                if prefix_len > 128 {
                    return Err(SubnetParseError::InvalidPrefixLen(prefix_len));
                }
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & mask_v6(prefix_len)))
            }
        };
        Ok(Self { addr, prefix_len })
    }

    /// Single-host range (`/32` or `/128`).
    pub fn host(addr: IpAddr) -> Self {
        let prefix_len = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self { addr, prefix_len }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.addr, addr) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                u32::from(addr) & mask_v4(self.prefix_len) == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                u128::from(addr) & mask_v6(self.prefix_len) == u128::from(net)
            }
            _ => false,
        }
    }
}

fn mask_v4(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_len)
    }
}

fn mask_v6(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - prefix_len)
    }
}

impl Display for Subnet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for Subnet {
    type Err = SubnetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            None => Ok(Self::host(s.parse()?)),
            Some((addr, prefix_len)) => {
                let addr = addr.parse::<IpAddr>()?;
                let prefix_len = prefix_len
                    .parse::<u8>()
                    .map_err(|_e| SubnetParseError::InvalidPrefix)?;
                Self::new(addr, prefix_len)
            }
        }
    }
}

impl Serialize for Subnet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Subnet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubnetParseError {
    #[error("invalid network address: {0}")]
    InvalidAddr(#[from] std::net::AddrParseError),
    #[error("invalid prefix: not a number")]
    InvalidPrefix,
    #[error("invalid prefix length: {0}")]
    InvalidPrefixLen(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for s in ["10.0.0.0/8", "192.168.1.1/32", "0.0.0.0/0", "fc00::/7"] {
            let subnet = s.parse::<Subnet>().unwrap();
            assert_eq!(subnet.to_string(), s);
        }
    }

    #[test]
    fn bare_addr_parses_as_host_range() {
        assert_eq!(
            "192.168.1.1".parse::<Subnet>().unwrap(),
            "192.168.1.1/32".parse::<Subnet>().unwrap()
        );
        assert_eq!("::1".parse::<Subnet>().unwrap().prefix_len(), 128);
    }

    #[test]
    fn host_bits_are_zeroed() {
        let subnet = "10.1.2.3/8".parse::<Subnet>().unwrap();
        assert_eq!(subnet.to_string(), "10.0.0.0/8");
        assert_eq!(subnet, "10.0.0.0/8".parse().unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!("10.0.0.0/33".parse::<Subnet>().is_err());
        assert!("::/129".parse::<Subnet>().is_err());
        assert!("10.0.0.0/x".parse::<Subnet>().is_err());
        assert!("not-an-addr/8".parse::<Subnet>().is_err());
        assert!("".parse::<Subnet>().is_err());
    }

    #[test]
    fn contains_honors_mask() {
        let subnet = "10.0.0.0/8".parse::<Subnet>().unwrap();
        assert!(subnet.contains("10.255.255.255".parse().unwrap()));
        assert!(subnet.contains("10.0.0.1".parse().unwrap()));
        assert!(!subnet.contains("11.0.0.1".parse().unwrap()));

        let all = "0.0.0.0/0".parse::<Subnet>().unwrap();
        assert!(all.contains("203.0.113.7".parse().unwrap()));

        let v6 = "2001:db8::/32".parse::<Subnet>().unwrap();
        assert!(v6.contains("2001:db8::1".parse().unwrap()));
        assert!(!v6.contains("2001:db9::1".parse().unwrap()));
    }

    #[test]
    fn v4_range_never_contains_v6_addr() {
        let subnet = "0.0.0.0/0".parse::<Subnet>().unwrap();
        assert!(!subnet.contains("::1".parse().unwrap()));
    }

    #[test]
    fn order_is_by_addr_then_prefix() {
        let mut subnets: Vec<Subnet> = ["192.168.1.1/32", "10.0.0.0/8", "10.0.0.0/16"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        subnets.sort_unstable();
        let displayed: Vec<_> = subnets.iter().map(ToString::to_string).collect();
        assert_eq!(displayed, ["10.0.0.0/8", "10.0.0.0/16", "192.168.1.1/32"]);
    }

    #[test]
    fn serde_uses_display_form() {
        let subnet = "10.0.0.0/8".parse::<Subnet>().unwrap();
        let json = serde_json::to_string(&subnet).unwrap();
        assert_eq!(json, "\"10.0.0.0/8\"");
        assert_eq!(serde_json::from_str::<Subnet>(&json).unwrap(), subnet);
    }
}
