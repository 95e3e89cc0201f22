/// Loopback Domain Types
///
/// Typed values that every command or XML payload is rendered from. Nothing
/// reaches a device template without first being parsed into one of these.

use crate::domain::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// IOS-XR 接口编号上限
pub const MAX_INTERFACE_NUMBER: u32 = 2_147_483_647;

const LOOPBACK_PREFIX: &str = "loopback";

/// Loopback interface number, rendered as `Loopback<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterfaceId(u32);

impl InterfaceId {
    pub fn new(number: u32) -> Result<Self, ValidationError> {
        if number > MAX_INTERFACE_NUMBER {
            return Err(ValidationError::InvalidInterface(format!(
                "interface number {} exceeds maximum {}",
                number, MAX_INTERFACE_NUMBER
            )));
        }
        Ok(Self(number))
    }

    /// Parses `50`, `Loopback50`, or `loopback 50`
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let digits = match trimmed.get(..LOOPBACK_PREFIX.len()) {
            Some(head) if head.eq_ignore_ascii_case(LOOPBACK_PREFIX) => {
                trimmed[LOOPBACK_PREFIX.len()..].trim_start()
            }
            _ => trimmed,
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidInterface(format!(
                "'{}' is not a loopback interface number",
                raw
            )));
        }

        let number = digits.parse::<u32>().map_err(|_| {
            ValidationError::InvalidInterface(format!("interface number '{}' is out of range", raw))
        })?;
        Self::new(number)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn name(&self) -> String {
        format!("Loopback{}", self.0)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loopback{}", self.0)
    }
}

/// IPv4 address with prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Interface {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
}

impl Ipv4Interface {
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self, ValidationError> {
        if prefix_len > 32 {
            return Err(ValidationError::InvalidMask(format!(
                "prefix length {} exceeds 32",
                prefix_len
            )));
        }
        Ok(Self { address, prefix_len })
    }

    /// Parses an address with an optional separate subnet.
    ///
    /// Without `subnet` the address may be `A.B.C.D/len`, `A.B.C.D M.M.M.M`,
    /// or a bare host address (treated as /32).
    pub fn parse(raw: &str, subnet: Option<&str>) -> Result<Self, ValidationError> {
        let raw = raw.trim();

        if let Some(subnet) = subnet {
            if raw.contains('/') || raw.contains(char::is_whitespace) {
                return Err(ValidationError::InvalidAddress(format!(
                    "'{}' already carries a mask; omit subnet or the prefix",
                    raw
                )));
            }
            return Self::new(parse_address(raw)?, parse_prefix(subnet)?);
        }

        if let Some((address, prefix)) = raw.split_once('/') {
            return Self::new(parse_address(address)?, parse_prefix(prefix)?);
        }

        let mut parts = raw.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(address), None, None) => Self::new(parse_address(address)?, 32),
            (Some(address), Some(mask), None) => {
                Self::new(parse_address(address)?, parse_prefix(mask)?)
            }
            _ => Err(ValidationError::InvalidAddress(format!(
                "'{}' is not an IPv4 address",
                raw
            ))),
        }
    }

    pub fn netmask(&self) -> Ipv4Addr {
        prefix_to_mask(self.prefix_len)
    }
}

impl fmt::Display for Ipv4Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

fn parse_address(raw: &str) -> Result<Ipv4Addr, ValidationError> {
    raw.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| ValidationError::InvalidAddress(format!("'{}' is not an IPv4 address", raw)))
}

/// Accepts `/28`, `28`, or `255.255.255.240`
fn parse_prefix(raw: &str) -> Result<u8, ValidationError> {
    let raw = raw.trim();
    let bare = raw.strip_prefix('/').unwrap_or(raw);

    if !bare.is_empty() && bare.bytes().all(|b| b.is_ascii_digit()) {
        return match bare.parse::<u8>() {
            Ok(len) if len <= 32 => Ok(len),
            _ => Err(ValidationError::InvalidMask(format!(
                "prefix length '{}' must be between 0 and 32",
                raw
            ))),
        };
    }

    let mask = bare
        .parse::<Ipv4Addr>()
        .map_err(|_| ValidationError::InvalidMask(format!("'{}' is not a subnet mask", raw)))?;
    mask_to_prefix(mask).ok_or_else(|| {
        ValidationError::InvalidMask(format!("'{}' is not a contiguous subnet mask", raw))
    })
}

/// 连续掩码转前缀长度，非连续掩码返回None
pub fn mask_to_prefix(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) == 0 {
        Some(ones as u8)
    } else {
        None
    }
}

pub fn prefix_to_mask(prefix_len: u8) -> Ipv4Addr {
    match prefix_len {
        0 => Ipv4Addr::UNSPECIFIED,
        len => Ipv4Addr::from(u32::MAX << (32 - u32::from(len.min(32)))),
    }
}

/// A validated loopback to be created on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackSpec {
    pub id: InterfaceId,
    pub description: Option<String>,
    pub ipv4: Ipv4Interface,
}

/// Loopback configuration as read back from the device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    pub id: Option<u32>,
    pub description: Option<String>,
    pub interface_type: Option<String>,
    pub address: Option<String>,
    pub netmask: Option<String>,
    pub prefix_length: Option<u8>,
    pub shutdown: bool,
}

impl InterfaceConfig {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = InterfaceId::parse(&name).ok().map(|id| id.number());
        Self {
            name,
            id,
            ..Default::default()
        }
    }

    /// 设置掩码的同时推导前缀长度
    pub fn set_netmask(&mut self, netmask: impl Into<String>) {
        let netmask = netmask.into();
        self.prefix_length = netmask.parse::<Ipv4Addr>().ok().and_then(mask_to_prefix);
        self.netmask = Some(netmask);
    }

    /// `address/prefix` when both are known
    pub fn cidr(&self) -> Option<String> {
        Some(format!("{}/{}", self.address.as_ref()?, self.prefix_length?))
    }
}
