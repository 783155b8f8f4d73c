//! # Proxmox VE Adapter
//!
//! Implements every collaborator port against a PVE host: `pct`/`qm` for
//! status, lifecycle, and in-guest queries; the `/etc/pve` config trees
//! for persisted guest configs.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

use ipanchor_common::network::interface::InterfaceAddress;
use ipanchor_common::workload::{GuestStatus, WorkloadKind};
use ipanchor_core::ports::{
    ConfigStore, GuestAgentQuery, LifecycleControl, LiveInterfaceQuery, StatusQuery,
};

/// Suffix appended to a config file's copy before it is rewritten.
const BACKUP_SUFFIX: &str = ".bak.static";

pub struct Pve {
    config_root: PathBuf,
}

impl Pve {
    pub fn new() -> Self {
        Self::with_root("/etc/pve")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            config_root: root.into(),
        }
    }

    fn kind_dir(&self, kind: WorkloadKind) -> PathBuf {
        match kind {
            WorkloadKind::Container => self.config_root.join("lxc"),
            WorkloadKind::Vm => self.config_root.join("qemu-server"),
        }
    }

    fn config_path(&self, id: &str, kind: WorkloadKind) -> PathBuf {
        self.kind_dir(kind).join(format!("{id}.conf"))
    }
}

impl Default for Pve {
    fn default() -> Self {
        Self::new()
    }
}

/// Control tool for a workload kind.
fn guest_tool(kind: WorkloadKind) -> &'static str {
    match kind {
        WorkloadKind::Container => "pct",
        WorkloadKind::Vm => "qm",
    }
}

async fn run_tool(tool: &str, args: &[&str]) -> anyhow::Result<String> {
    debug!(%tool, ?args, "executing hypervisor command");
    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .with_context(|| format!("spawning `{tool}`"))?;

    if !output.status.success() {
        anyhow::bail!(
            "`{tool} {}` failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl StatusQuery for Pve {
    async fn status(&self, id: &str, kind: WorkloadKind) -> GuestStatus {
        match run_tool(guest_tool(kind), &["status", id]).await {
            Ok(stdout) => parse_status(&stdout),
            Err(err) => {
                debug!(%id, error = %err, "status query failed");
                GuestStatus::Unknown
            }
        }
    }
}

/// `pct status 101` / `qm status 100` print a single `status: <state>`.
fn parse_status(stdout: &str) -> GuestStatus {
    match stdout.split_whitespace().last() {
        Some("running") => GuestStatus::Running,
        Some("stopped") => GuestStatus::Stopped,
        _ => GuestStatus::Unknown,
    }
}

#[async_trait]
impl LiveInterfaceQuery for Pve {
    async fn interface_addresses(&self, id: &str) -> anyhow::Result<Vec<InterfaceAddress>> {
        let stdout =
            run_tool("pct", &["exec", id, "--", "ip", "-4", "-o", "addr", "show"]).await?;
        Ok(parse_oneline_addr(&stdout))
    }
}

/// One `ip -4 -o addr show` record per line:
/// `2: eth0    inet 192.168.0.5/24 brd 192.168.0.255 scope global eth0`.
fn parse_oneline_addr(stdout: &str) -> Vec<InterfaceAddress> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            let _index = words.next()?;
            let name = words.next()?.trim_end_matches(':');
            let family = words.next()?;
            let cidr = words.next()?;
            if family != "inet" {
                return None;
            }
            let addr = cidr.split('/').next()?.parse().ok()?;
            Some(InterfaceAddress::new(name, addr))
        })
        .collect()
}

/// Wire shape of `qm guest cmd <id> network-get-interfaces`.
#[derive(Deserialize)]
struct AgentInterface {
    name: String,
    #[serde(default, rename = "ip-addresses")]
    ip_addresses: Vec<AgentAddress>,
}

#[derive(Deserialize)]
struct AgentAddress {
    #[serde(rename = "ip-address-type")]
    family: String,
    #[serde(rename = "ip-address")]
    address: String,
}

/// Some `qm` versions wrap the agent reply in `{"result": [...]}`.
#[derive(Deserialize)]
struct AgentEnvelope {
    result: Vec<AgentInterface>,
}

#[async_trait]
impl GuestAgentQuery for Pve {
    async fn network_interfaces(&self, id: &str) -> anyhow::Result<Vec<InterfaceAddress>> {
        let stdout = run_tool("qm", &["guest", "cmd", id, "network-get-interfaces"]).await?;
        parse_agent_interfaces(&stdout)
    }
}

fn parse_agent_interfaces(json: &str) -> anyhow::Result<Vec<InterfaceAddress>> {
    let interfaces: Vec<AgentInterface> = match serde_json::from_str(json) {
        Ok(list) => list,
        Err(_) => {
            serde_json::from_str::<AgentEnvelope>(json)
                .context("decoding guest agent response")?
                .result
        }
    };

    let mut addresses: Vec<InterfaceAddress> = Vec::new();
    for interface in interfaces {
        for entry in interface.ip_addresses {
            if entry.family != "ipv4" {
                continue;
            }
            if let Ok(addr) = entry.address.parse() {
                addresses.push(InterfaceAddress::new(interface.name.clone(), addr));
            }
        }
    }
    Ok(addresses)
}

#[async_trait]
impl ConfigStore for Pve {
    async fn list(&self, kind: WorkloadKind) -> anyhow::Result<Vec<String>> {
        let dir = self.kind_dir(kind);
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("listing {}", dir.display()))?;

        let mut ids: Vec<String> = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(id) = name.strip_suffix(".conf") {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn read(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<String> {
        let path = self.config_path(id, kind);
        fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))
    }

    async fn write(&self, id: &str, kind: WorkloadKind, text: &str) -> anyhow::Result<()> {
        let path = self.config_path(id, kind);
        let backup = PathBuf::from(format!("{}{BACKUP_SUFFIX}", path.display()));

        fs::copy(&path, &backup)
            .await
            .with_context(|| format!("backing up {} to {}", path.display(), backup.display()))?;
        fs::write(&path, text)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl LifecycleControl for Pve {
    async fn stop(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<()> {
        run_tool(guest_tool(kind), &["stop", id]).await.map(drop)
    }

    async fn start(&self, id: &str, kind: WorkloadKind) -> anyhow::Result<()> {
        run_tool(guest_tool(kind), &["start", id]).await.map(drop)
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
