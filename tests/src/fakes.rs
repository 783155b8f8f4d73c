//! An in-memory hypervisor stand-in implementing every collaborator port,
//! with call counters for interaction assertions.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use ipanchor_common::network::interface::InterfaceAddress;
use ipanchor_common::workload::{GuestStatus, WorkloadKind};
use ipanchor_core::engine::Engine;
use ipanchor_core::ports::{
    ConfigStore, GuestAgentQuery, LifecycleControl, LiveInterfaceQuery, StatusQuery,
};

pub struct FakeCluster {
    container_configs: Mutex<BTreeMap<String, String>>,
    vm_configs: Mutex<BTreeMap<String, String>>,
    statuses: Mutex<BTreeMap<String, GuestStatus>>,
    /// Addresses any container reports through the shell listing.
    pub container_addrs: Vec<InterfaceAddress>,
    /// Agent reply for any VM; `None` means the agent call fails.
    pub agent_result: Option<Vec<InterfaceAddress>>,
    pub fail_start: bool,
    pub agent_calls: AtomicUsize,
    pub live_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub stops: Mutex<Vec<String>>,
    pub starts: Mutex<Vec<String>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self {
            container_configs: Mutex::new(BTreeMap::new()),
            vm_configs: Mutex::new(BTreeMap::new()),
            statuses: Mutex::new(BTreeMap::new()),
            container_addrs: Vec::new(),
            agent_result: Some(Vec::new()),
            fail_start: false,
            agent_calls: AtomicUsize::new(0),
            live_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            stops: Mutex::new(Vec::new()),
            starts: Mutex::new(Vec::new()),
        }
    }

    /// Registers a guest with its status and persisted config. Ids are
    /// unique across kinds, as on a real cluster.
    pub fn add(&self, kind: WorkloadKind, id: &str, status: GuestStatus, config: &str) {
        self.configs(kind)
            .lock()
            .unwrap()
            .insert(id.to_string(), config.to_string());
        self.statuses.lock().unwrap().insert(id.to_string(), status);
    }

    pub fn config_of(&self, kind: WorkloadKind, id: &str) -> String {
        self.configs(kind)
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .expect("config registered in the fake")
    }

    fn configs(&self, kind: WorkloadKind) -> &Mutex<BTreeMap<String, String>> {
        match kind {
            WorkloadKind::Container => &self.container_configs,
            WorkloadKind::Vm => &self.vm_configs,
        }
    }
}

/// Wires one fake into every port of the engine.
pub fn engine(fake: &FakeCluster) -> Engine<'_> {
    Engine {
        status: fake,
        containers: fake,
        agent: fake,
        store: fake,
        lifecycle: fake,
    }
}

#[async_trait]
impl StatusQuery for FakeCluster {
    async fn status(&self, id: &str, _kind: WorkloadKind) -> GuestStatus {
        self.statuses
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(GuestStatus::Unknown)
    }
}

#[async_trait]
impl LiveInterfaceQuery for FakeCluster {
    async fn interface_addresses(&self, _id: &str) -> anyhow::Result<Vec<InterfaceAddress>> {
        self.live_calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.container_addrs.clone())
    }
}

#[async_trait]
impl GuestAgentQuery for FakeCluster {
    async fn network_interfaces(&self, _id: &str) -> anyhow::Result<Vec<InterfaceAddress>> {
        self.agent_calls.fetch_add(1, Ordering::Relaxed);
        match &self.agent_result {
            Some(addrs) => Ok(addrs.clone()),
            None => Err(anyhow::anyhow!("QEMU guest agent is not running")),
        }
    }
}

#[async_trait]
impl ConfigStore for FakeCluster {
    async fn list(&self, kind: WorkloadKind) -> anyhow::Result<Vec<String>> {
        Ok(self.configs(kind).lock().unwrap().keys().cloned().collect())
    }

    async fn read(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<String> {
        self.configs(kind)
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no config for guest {id}"))
    }

    async fn write(&self, id: &str, kind: WorkloadKind, text: &str) -> anyhow::Result<()> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        self.configs(kind)
            .lock()
            .unwrap()
            .insert(id.to_string(), text.to_string());
        Ok(())
    }
}

#[async_trait]
impl LifecycleControl for FakeCluster {
    async fn stop(&self, id: &str, _kind: WorkloadKind) -> anyhow::Result<()> {
        self.stops.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn start(&self, id: &str, _kind: WorkloadKind) -> anyhow::Result<()> {
        self.starts.lock().unwrap().push(id.to_string());
        if self.fail_start {
            anyhow::bail!("start failed: timeout waiting for guest");
        }
        Ok(())
    }
}
