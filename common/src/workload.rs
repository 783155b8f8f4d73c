//! # Workload Model
//!
//! Containers and VMs share the whole resolve→compare→mutate pipeline;
//! everything kind-specific (config field name, control tool, live
//! introspection channel) hangs off [`WorkloadKind`] so the pipeline itself
//! is written once.

use std::fmt;
use std::net::Ipv4Addr;

/// Conventional primary interface name inside LXC containers.
pub const PRIMARY_IFACE: &str = "eth0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Container,
    Vm,
}

impl WorkloadKind {
    /// Key of the primary network field in this kind's config format.
    pub fn net_field(self) -> &'static str {
        match self {
            Self::Container => "net0",
            Self::Vm => "ipconfig0",
        }
    }

    /// Short operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Container => "CT",
            Self::Vm => "VM",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Vm => write!(f, "VM"),
        }
    }
}

/// One guest under management.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub id: String,
    pub kind: WorkloadKind,
}

impl Workload {
    pub fn new(id: impl Into<String>, kind: WorkloadKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// Observed lifecycle state of a guest. Probe failures collapse into
/// `Unknown`, which the pipeline treats as not running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuestStatus {
    Running,
    Stopped,
    Unknown,
}

/// Why a workload could not be resolved to a target address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No tag carried an address inside the subnet.
    NoTagMatch,
    /// The workload is not running, so live detection is impossible.
    NotRunning,
    /// The guest agent is absent, unresponsive, or returned nothing usable.
    NoGuestAgent,
    /// Live interfaces were listed but none carried a subnet address.
    NoMatchingInterface,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoTagMatch => "no tag matches the subnet",
            Self::NotRunning => "not running and no tag pins an address",
            Self::NoGuestAgent => "guest agent unavailable",
            Self::NoMatchingInterface => "no live address inside the subnet",
        };
        f.write_str(reason)
    }
}

/// Outcome of the IP resolution pipeline for one workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Ipv4Addr),
    Unresolved(SkipReason),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_field_depends_on_kind() {
        assert_eq!(WorkloadKind::Container.net_field(), "net0");
        assert_eq!(WorkloadKind::Vm.net_field(), "ipconfig0");
    }

    #[test]
    fn labels_are_operator_shorthand() {
        assert_eq!(WorkloadKind::Container.label(), "CT");
        assert_eq!(WorkloadKind::Vm.label(), "VM");
    }
}
