//! # Subnet Prefix Model
//!
//! An octet-aligned IPv4 subnet, used to decide whether a candidate address
//! belongs to the network being assigned. Only /8, /16, /24 and /32 masks
//! exist here: membership is per-octet equality on the leading octets,
//! never a bitwise operation.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::IntentError;
use crate::network::interface::InterfaceAddress;

/// Prefix lengths representable as whole octets.
const ALIGNED_PREFIXES: [u8; 4] = [8, 16, 24, 32];

/// An immutable, octet-aligned subnet prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubnetSpec {
    prefix: Vec<u8>,
    prefix_bits: u8,
}

impl SubnetSpec {
    /// Derives the subnet from the run's gateway and netmask input.
    ///
    /// `netmask` accepts a dotted-quad mask (`255.255.255.0`) or a bare
    /// prefix length (`24`); anything not octet-aligned is rejected.
    pub fn derive(gateway: Ipv4Addr, netmask: &str) -> Result<Self, IntentError> {
        let prefix_bits: u8 = parse_netmask(netmask)?;
        let octet_count = usize::from(prefix_bits / 8);
        Ok(Self {
            prefix: gateway.octets()[..octet_count].to_vec(),
            prefix_bits,
        })
    }

    pub fn prefix_bits(&self) -> u8 {
        self.prefix_bits
    }

    /// True iff the leading prefix octets of `candidate` equal the subnet's
    /// prefix octets exactly.
    pub fn matches(&self, candidate: Ipv4Addr) -> bool {
        candidate.octets()[..self.prefix.len()] == self.prefix[..]
    }

    /// First candidate, in source order, that is a valid IPv4 literal fully
    /// inside the subnet. Candidates that are not addresses are ignored,
    /// never errors.
    pub fn first_match<'a, I>(&self, candidates: I) -> Option<Ipv4Addr>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter_map(|candidate| candidate.trim().parse::<Ipv4Addr>().ok())
            .find(|addr| self.matches(*addr))
    }

    /// First IPv4 address inside the subnet among `interfaces`, optionally
    /// restricted to a single interface name.
    pub fn first_interface_match(
        &self,
        interfaces: &[InterfaceAddress],
        name: Option<&str>,
    ) -> Option<Ipv4Addr> {
        interfaces
            .iter()
            .filter(|iface| name.is_none_or(|n| iface.name == n))
            .filter_map(|iface| match iface.addr {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .find(|addr| self.matches(*addr))
    }
}

impl fmt::Display for SubnetSpec {
    /// Network notation, e.g. `192.168.1.0/24`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut octets: [u8; 4] = [0; 4];
        octets[..self.prefix.len()].copy_from_slice(&self.prefix);
        write!(f, "{}/{}", Ipv4Addr::from(octets), self.prefix_bits)
    }
}

fn parse_netmask(input: &str) -> Result<u8, IntentError> {
    let trimmed = input.trim();

    let bits: u8 = if let Ok(mask) = trimmed.parse::<Ipv4Addr>() {
        let raw: u32 = u32::from(mask);
        let bits = raw.count_ones() as u8;
        if raw != leading_bits(bits) {
            return Err(IntentError::NonContiguousMask(trimmed.to_string()));
        }
        bits
    } else {
        trimmed
            .parse::<u8>()
            .map_err(|_| IntentError::UnparsableNetmask(trimmed.to_string()))?
    };

    if !ALIGNED_PREFIXES.contains(&bits) {
        return Err(IntentError::NotOctetAligned(bits));
    }
    Ok(bits)
}

fn leading_bits(bits: u8) -> u32 {
    if bits == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(bits))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
