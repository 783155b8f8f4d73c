//! # Desired Network State
//!
//! The single target state applied to every workload in one run: a gateway
//! and the subnet derived from it. Created once at startup from CLI input
//! or auto-detection, immutable afterwards.

use std::fmt;
use std::net::Ipv4Addr;

use crate::error::IntentError;
use crate::network::subnet::SubnetSpec;

/// A static address paired with its prefix length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetAddress {
    pub addr: Ipv4Addr,
    pub prefix_bits: u8,
}

impl fmt::Display for TargetAddress {
    /// CIDR notation, e.g. `192.168.1.50/24`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_bits)
    }
}

/// Address and gateway as desired for (or parsed out of) one guest
/// config's primary network field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub address: TargetAddress,
    pub gateway: Ipv4Addr,
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gw {}", self.address, self.gateway)
    }
}

/// The desired network state for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkIntent {
    gateway: Ipv4Addr,
    subnet: SubnetSpec,
}

impl NetworkIntent {
    pub fn derive(gateway: Ipv4Addr, netmask: &str) -> Result<Self, IntentError> {
        Ok(Self {
            gateway,
            subnet: SubnetSpec::derive(gateway, netmask)?,
        })
    }

    pub fn gateway(&self) -> Ipv4Addr {
        self.gateway
    }

    pub fn subnet(&self) -> &SubnetSpec {
        &self.subnet
    }

    /// The full desired config once a workload's address is resolved.
    pub fn target_for(&self, addr: Ipv4Addr) -> ResolvedConfig {
        ResolvedConfig {
            address: TargetAddress {
                addr,
                prefix_bits: self.subnet.prefix_bits(),
            },
            gateway: self.gateway,
        }
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
