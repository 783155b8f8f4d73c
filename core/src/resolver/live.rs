//! # Live Address Detection
//!
//! Fallback when no tag pins an address: ask the running guest what it
//! currently holds. Containers are inspected through a shell-level
//! interface listing restricted to the conventional primary interface; VMs
//! through the guest agent, bounded by a fixed timeout since an absent
//! agent otherwise blocks forever.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use ipanchor_common::network::subnet::SubnetSpec;
use ipanchor_common::workload::{
    GuestStatus, PRIMARY_IFACE, Resolution, SkipReason, Workload, WorkloadKind,
};

use crate::resolver::Resolver;

/// Upper bound on one guest-agent round trip.
const AGENT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn resolve(
    deps: &Resolver<'_>,
    workload: &Workload,
    subnet: &SubnetSpec,
) -> Resolution {
    match deps.status.status(&workload.id, workload.kind).await {
        GuestStatus::Running => {}
        status => {
            debug!(id = %workload.id, ?status, "guest not running, live detection unavailable");
            return Resolution::Unresolved(SkipReason::NotRunning);
        }
    }

    match workload.kind {
        WorkloadKind::Container => container_address(deps, workload, subnet).await,
        WorkloadKind::Vm => vm_address(deps, workload, subnet).await,
    }
}

async fn container_address(
    deps: &Resolver<'_>,
    workload: &Workload,
    subnet: &SubnetSpec,
) -> Resolution {
    let interfaces = match deps.containers.interface_addresses(&workload.id).await {
        Ok(interfaces) => interfaces,
        Err(err) => {
            warn!(id = %workload.id, error = %err, "container interface listing failed");
            return Resolution::Unresolved(SkipReason::NoMatchingInterface);
        }
    };

    match subnet.first_interface_match(&interfaces, Some(PRIMARY_IFACE)) {
        Some(addr) => Resolution::Resolved(addr),
        None => Resolution::Unresolved(SkipReason::NoMatchingInterface),
    }
}

async fn vm_address(
    deps: &Resolver<'_>,
    workload: &Workload,
    subnet: &SubnetSpec,
) -> Resolution {
    let interfaces = match timeout(AGENT_TIMEOUT, deps.agent.network_interfaces(&workload.id)).await
    {
        Err(_) => {
            warn!(id = %workload.id, "guest agent query timed out");
            return Resolution::Unresolved(SkipReason::NoGuestAgent);
        }
        Ok(Err(err)) => {
            warn!(id = %workload.id, error = %err, "guest agent query failed");
            return Resolution::Unresolved(SkipReason::NoGuestAgent);
        }
        Ok(Ok(interfaces)) if interfaces.is_empty() => {
            return Resolution::Unresolved(SkipReason::NoGuestAgent);
        }
        Ok(Ok(interfaces)) => interfaces,
    };

    match subnet.first_interface_match(&interfaces, None) {
        Some(addr) => Resolution::Resolved(addr),
        None => Resolution::Unresolved(SkipReason::NoMatchingInterface),
    }
}
