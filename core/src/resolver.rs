//! # IP Resolution Pipeline
//!
//! Decides each workload's target address. Tags are consulted first and a
//! tag hit is authoritative: the live collaborators are never queried for
//! a tagged workload, so an operator tag always overrides whatever address
//! the guest currently reports.

mod live;
mod tag;

use ipanchor_common::network::subnet::SubnetSpec;
use ipanchor_common::workload::{Resolution, Workload};

use crate::ports::{GuestAgentQuery, LiveInterfaceQuery, StatusQuery};

/// The collaborators live detection needs, bundled for injection.
pub struct Resolver<'a> {
    pub status: &'a dyn StatusQuery,
    pub containers: &'a dyn LiveInterfaceQuery,
    pub agent: &'a dyn GuestAgentQuery,
}

impl Resolver<'_> {
    /// Resolves `workload` to a target address, or the reason it has none.
    pub async fn resolve(
        &self,
        workload: &Workload,
        tags_field: Option<&str>,
        subnet: &SubnetSpec,
    ) -> Resolution {
        if let Some(addr) = tag::first_tag_address(tags_field, subnet) {
            return Resolution::Resolved(addr);
        }
        live::resolve(self, workload, subnet).await
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
