//! # Sequential Update Engine
//!
//! One workload at a time: read the persisted config, resolve the target
//! address, decide idempotently whether anything must change, mutate,
//! persist with a backup, restart the guest when it was running. Outcomes
//! are returned per workload and folded by the caller into a [`RunReport`];
//! nothing is accumulated globally, and no per-workload failure ever aborts
//! the run.

use anyhow::Context;
use tracing::debug;

use ipanchor_common::config::RunConfig;
use ipanchor_common::network::intent::{NetworkIntent, ResolvedConfig};
use ipanchor_common::workload::{GuestStatus, Resolution, SkipReason, Workload, WorkloadKind};

use crate::netconf::compare::{self, ConfigState};
use crate::netconf::line::ConfigDoc;
use crate::netconf::mutate;
use crate::ports::{ConfigStore, GuestAgentQuery, LifecycleControl, LiveInterfaceQuery, StatusQuery};
use crate::resolver::Resolver;

/// Key of the metadata field optionally pinning an address.
const TAGS_FIELD: &str = "tags";

/// What happened to one workload.
#[derive(Debug)]
pub enum WorkloadOutcome {
    /// Config rewritten and persisted; `restarted` says whether the guest
    /// was stop/start cycled (only running guests are).
    Updated {
        target: ResolvedConfig,
        previous: Option<ResolvedConfig>,
        restarted: bool,
    },
    /// Config already satisfies the target state; nothing was touched.
    AlreadyCorrect { target: ResolvedConfig },
    /// Dry run: a change was computed but not persisted.
    WouldUpdate {
        target: ResolvedConfig,
        previous: Option<ResolvedConfig>,
    },
    /// No target address could be resolved.
    Skipped(SkipReason),
    /// The update failed; the run continues with the next workload.
    Failed(anyhow::Error),
}

/// Per-kind outcome counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Folded outcomes of a whole run.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunReport {
    pub containers: Tally,
    pub vms: Tally,
}

impl RunReport {
    pub fn record(&mut self, kind: WorkloadKind, outcome: &WorkloadOutcome) {
        let tally = match kind {
            WorkloadKind::Container => &mut self.containers,
            WorkloadKind::Vm => &mut self.vms,
        };
        match outcome {
            WorkloadOutcome::Updated { .. } | WorkloadOutcome::WouldUpdate { .. } => {
                tally.updated += 1;
            }
            WorkloadOutcome::AlreadyCorrect { .. } => tally.unchanged += 1,
            WorkloadOutcome::Skipped(_) => tally.skipped += 1,
            WorkloadOutcome::Failed(_) => tally.failed += 1,
        }
    }

    pub fn failures(&self) -> usize {
        self.containers.failed + self.vms.failed
    }
}

/// The engine with its collaborator ports injected.
pub struct Engine<'a> {
    pub status: &'a dyn StatusQuery,
    pub containers: &'a dyn LiveInterfaceQuery,
    pub agent: &'a dyn GuestAgentQuery,
    pub store: &'a dyn ConfigStore,
    pub lifecycle: &'a dyn LifecycleControl,
}

impl Engine<'_> {
    /// All managed workloads: containers first, each kind in the store's
    /// (file-name lexical) order.
    pub async fn discover(&self) -> anyhow::Result<Vec<Workload>> {
        let mut workloads: Vec<Workload> = Vec::new();
        for kind in [WorkloadKind::Container, WorkloadKind::Vm] {
            let ids = self
                .store
                .list(kind)
                .await
                .with_context(|| format!("listing {kind} configs"))?;
            workloads.extend(ids.into_iter().map(|id| Workload::new(id, kind)));
        }
        Ok(workloads)
    }

    /// Runs the full pipeline for one workload. Every failure is folded
    /// into the returned outcome; the caller decides nothing but display
    /// and tallying.
    pub async fn process(
        &self,
        workload: &Workload,
        intent: &NetworkIntent,
        cfg: &RunConfig,
    ) -> WorkloadOutcome {
        match self.try_process(workload, intent, cfg).await {
            Ok(outcome) => outcome,
            Err(err) => WorkloadOutcome::Failed(err),
        }
    }

    async fn try_process(
        &self,
        workload: &Workload,
        intent: &NetworkIntent,
        cfg: &RunConfig,
    ) -> anyhow::Result<WorkloadOutcome> {
        let text = self
            .store
            .read(&workload.id, workload.kind)
            .await
            .with_context(|| {
                format!("reading config of {} {}", workload.kind.label(), workload.id)
            })?;

        let tags = ConfigDoc::parse(&text).field(TAGS_FIELD);
        let resolver = Resolver {
            status: self.status,
            containers: self.containers,
            agent: self.agent,
        };
        let addr = match resolver.resolve(workload, tags, intent.subnet()).await {
            Resolution::Resolved(addr) => addr,
            Resolution::Unresolved(reason) => return Ok(WorkloadOutcome::Skipped(reason)),
        };

        let target = intent.target_for(addr);
        if compare::compare(&text, workload.kind, &target) == ConfigState::AlreadyCorrect {
            return Ok(WorkloadOutcome::AlreadyCorrect { target });
        }

        let previous = compare::current_config(&text, workload.kind);
        let updated = mutate::apply(&text, workload.kind, &target)?;
        if cfg.dry_run {
            return Ok(WorkloadOutcome::WouldUpdate { target, previous });
        }
        self.store
            .write(&workload.id, workload.kind, &updated)
            .await
            .with_context(|| {
                format!("writing config of {} {}", workload.kind.label(), workload.id)
            })?;

        let restarted = self.restart_if_running(workload).await?;
        Ok(WorkloadOutcome::Updated {
            target,
            previous,
            restarted,
        })
    }

    /// Stop-then-start for a running guest. A start failure after a
    /// successful stop leaves the guest stopped; it is reported, never
    /// retried.
    async fn restart_if_running(&self, workload: &Workload) -> anyhow::Result<bool> {
        if self.status.status(&workload.id, workload.kind).await != GuestStatus::Running {
            debug!(id = %workload.id, "guest not running, config applies on next start");
            return Ok(false);
        }

        self.lifecycle
            .stop(&workload.id, workload.kind)
            .await
            .with_context(|| format!("stopping {} {}", workload.kind.label(), workload.id))?;
        self.lifecycle
            .start(&workload.id, workload.kind)
            .await
            .with_context(|| {
                format!(
                    "starting {} {} after config update (guest left stopped)",
                    workload.kind.label(),
                    workload.id
                )
            })?;
        Ok(true)
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
