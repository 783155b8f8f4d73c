//! # Collaborator Ports
//!
//! Contracts for interactions initiated by the engine towards the outside
//! world.
//!
//! ## Rules
//! 1. All items here are `traits`.
//! 2. No concrete implementations allowed.
//! 3. Domain models from `ipanchor-common` in signatures are encouraged.
//! 4. Implemented in `ipanchor-cli` (adapters) and in test fakes.

use async_trait::async_trait;

use ipanchor_common::network::interface::InterfaceAddress;
use ipanchor_common::workload::{GuestStatus, WorkloadKind};

/// Lifecycle status probe. Failures are reported as
/// [`GuestStatus::Unknown`], never as errors: an unreachable guest is
/// treated as not running.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    async fn status(&self, id: &str, kind: WorkloadKind) -> GuestStatus;
}

/// Shell-level interface listing inside a running container.
#[async_trait]
pub trait LiveInterfaceQuery: Send + Sync {
    async fn interface_addresses(&self, id: &str) -> anyhow::Result<Vec<InterfaceAddress>>;
}

/// Guest-agent interface listing inside a running VM. Implementations may
/// block indefinitely; the resolver bounds the call with its own timeout.
#[async_trait]
pub trait GuestAgentQuery: Send + Sync {
    async fn network_interfaces(&self, id: &str) -> anyhow::Result<Vec<InterfaceAddress>>;
}

/// Persisted guest configuration records.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Workload ids of `kind`, in lexical order of their config file names.
    async fn list(&self, kind: WorkloadKind) -> anyhow::Result<Vec<String>>;

    async fn read(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<String>;

    /// Persists `text`, preserving the previous content under a
    /// `.bak.static` sibling before the write.
    async fn write(&self, id: &str, kind: WorkloadKind, text: &str) -> anyhow::Result<()>;
}

/// Start/stop control. Stop and start fail independently; a start failure
/// after a successful stop leaves the guest stopped. The engine reports
/// it and moves on, it never retries or rolls the config back.
#[async_trait]
pub trait LifecycleControl: Send + Sync {
    async fn stop(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<()>;
    async fn start(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<()>;
}
