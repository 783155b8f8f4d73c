use std::net::IpAddr;
use std::sync::atomic::Ordering;

use ipanchor_common::config::RunConfig;
use ipanchor_common::network::intent::NetworkIntent;
use ipanchor_common::network::interface::InterfaceAddress;
use ipanchor_common::workload::{GuestStatus, SkipReason, Workload, WorkloadKind};
use ipanchor_core::engine::{RunReport, Tally, WorkloadOutcome};

use crate::fakes::{FakeCluster, engine};

const APPLY: RunConfig = RunConfig {
    dry_run: false,
    assume_yes: true,
};

fn intent() -> NetworkIntent {
    NetworkIntent::derive("192.168.0.1".parse().unwrap(), "255.255.255.0").unwrap()
}

fn v4(addr: &str) -> IpAddr {
    IpAddr::V4(addr.parse().unwrap())
}

#[tokio::test]
async fn stopped_container_with_dhcp_is_skipped_not_errored() {
    let fake = FakeCluster::new();
    fake.add(
        WorkloadKind::Container,
        "101",
        GuestStatus::Stopped,
        "arch: amd64\nnet0: name=eth0,bridge=vmbr0,ip=dhcp\n",
    );

    let workload = Workload::new("101", WorkloadKind::Container);
    let outcome = engine(&fake).process(&workload, &intent(), &APPLY).await;

    assert!(matches!(
        outcome,
        WorkloadOutcome::Skipped(SkipReason::NotRunning)
    ));
    assert_eq!(fake.write_calls.load(Ordering::Relaxed), 0);

    let mut report = RunReport::default();
    report.record(workload.kind, &outcome);
    assert_eq!(report.containers.skipped, 1);
    assert_eq!(report.failures(), 0);
}

#[tokio::test]
async fn tagged_vm_updates_without_querying_the_agent() {
    let fake = FakeCluster::new();
    fake.add(
        WorkloadKind::Vm,
        "100",
        GuestStatus::Running,
        "ipconfig0: ip=dhcp\ntags: web;192.168.0.42\n",
    );

    let workload = Workload::new("100", WorkloadKind::Vm);
    let outcome = engine(&fake).process(&workload, &intent(), &APPLY).await;

    assert!(matches!(
        outcome,
        WorkloadOutcome::Updated {
            restarted: true,
            ..
        }
    ));
    assert_eq!(fake.agent_calls.load(Ordering::Relaxed), 0);
    assert_eq!(
        fake.config_of(WorkloadKind::Vm, "100"),
        "ipconfig0: ip=192.168.0.42/24,gw=192.168.0.1\ntags: web;192.168.0.42\n"
    );
    assert_eq!(*fake.stops.lock().unwrap(), vec!["100".to_string()]);
    assert_eq!(*fake.starts.lock().unwrap(), vec!["100".to_string()]);
}

#[tokio::test]
async fn dry_run_writes_and_restarts_nothing() {
    let fake = FakeCluster::new();
    let text = "ipconfig0: ip=dhcp\ntags: 192.168.0.42\n";
    fake.add(WorkloadKind::Vm, "100", GuestStatus::Running, text);

    let cfg = RunConfig {
        dry_run: true,
        assume_yes: true,
    };
    let workload = Workload::new("100", WorkloadKind::Vm);
    let outcome = engine(&fake).process(&workload, &intent(), &cfg).await;

    assert!(matches!(outcome, WorkloadOutcome::WouldUpdate { .. }));
    assert_eq!(fake.write_calls.load(Ordering::Relaxed), 0);
    assert!(fake.stops.lock().unwrap().is_empty());
    assert_eq!(fake.config_of(WorkloadKind::Vm, "100"), text);
}

#[tokio::test]
async fn config_without_primary_field_fails_even_in_dry_run() {
    let fake = FakeCluster::new();
    fake.add(
        WorkloadKind::Vm,
        "100",
        GuestStatus::Running,
        "cores: 2\ntags: 192.168.0.42\n",
    );

    let cfg = RunConfig {
        dry_run: true,
        assume_yes: true,
    };
    let workload = Workload::new("100", WorkloadKind::Vm);
    let outcome = engine(&fake).process(&workload, &intent(), &cfg).await;

    assert!(matches!(outcome, WorkloadOutcome::Failed(_)));
    assert_eq!(fake.write_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn already_correct_config_is_never_rewritten_or_restarted() {
    let fake = FakeCluster::new();
    fake.add(
        WorkloadKind::Vm,
        "100",
        GuestStatus::Running,
        "ipconfig0: ip=192.168.0.42/24,gw=192.168.0.1\ntags: 192.168.0.42\n",
    );

    let workload = Workload::new("100", WorkloadKind::Vm);
    let outcome = engine(&fake).process(&workload, &intent(), &APPLY).await;

    assert!(matches!(outcome, WorkloadOutcome::AlreadyCorrect { .. }));
    assert_eq!(fake.write_calls.load(Ordering::Relaxed), 0);
    assert!(fake.stops.lock().unwrap().is_empty());
}

#[tokio::test]
async fn start_failure_after_stop_counts_as_error_and_leaves_guest_stopped() {
    let mut fake = FakeCluster::new();
    fake.fail_start = true;
    fake.container_addrs = vec![InterfaceAddress::new("eth0", v4("192.168.0.55"))];
    fake.add(
        WorkloadKind::Container,
        "101",
        GuestStatus::Running,
        "net0: name=eth0,bridge=vmbr0,ip=dhcp\n",
    );

    let workload = Workload::new("101", WorkloadKind::Container);
    let outcome = engine(&fake).process(&workload, &intent(), &APPLY).await;

    assert!(matches!(outcome, WorkloadOutcome::Failed(_)));
    // The config write already happened; the guest stays stopped.
    assert_eq!(
        fake.config_of(WorkloadKind::Container, "101"),
        "net0: name=eth0,bridge=vmbr0,ip=192.168.0.55/24,gw=192.168.0.1\n"
    );
    assert_eq!(*fake.stops.lock().unwrap(), vec!["101".to_string()]);
    assert_eq!(*fake.starts.lock().unwrap(), vec!["101".to_string()]);

    let mut report = RunReport::default();
    report.record(workload.kind, &outcome);
    assert_eq!(report.containers.failed, 1);
}

#[tokio::test]
async fn full_run_processes_containers_first_in_lexical_order() {
    let mut fake = FakeCluster::new();
    fake.container_addrs = vec![InterfaceAddress::new("eth0", v4("192.168.0.55"))];
    fake.agent_result = None; // agent is down on every VM

    fake.add(
        WorkloadKind::Container,
        "101",
        GuestStatus::Stopped,
        "net0: name=eth0,ip=dhcp\n",
    );
    fake.add(
        WorkloadKind::Container,
        "100",
        GuestStatus::Running,
        "net0: name=eth0,ip=dhcp\n",
    );
    fake.add(
        WorkloadKind::Vm,
        "200",
        GuestStatus::Running,
        "ipconfig0: ip=dhcp\n",
    );
    fake.add(
        WorkloadKind::Vm,
        "201",
        GuestStatus::Running,
        "ipconfig0: ip=dhcp\ntags: 192.168.0.42\n",
    );

    let eng = engine(&fake);
    let workloads = eng.discover().await.unwrap();
    let order: Vec<(WorkloadKind, String)> = workloads
        .iter()
        .map(|w| (w.kind, w.id.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            (WorkloadKind::Container, "100".to_string()),
            (WorkloadKind::Container, "101".to_string()),
            (WorkloadKind::Vm, "200".to_string()),
            (WorkloadKind::Vm, "201".to_string()),
        ]
    );

    let mut report = RunReport::default();
    for workload in &workloads {
        let outcome = eng.process(workload, &intent(), &APPLY).await;
        report.record(workload.kind, &outcome);
    }

    assert_eq!(
        report.containers,
        Tally {
            updated: 1,
            unchanged: 0,
            skipped: 1,
            failed: 0
        }
    );
    assert_eq!(
        report.vms,
        Tally {
            updated: 1,
            unchanged: 0,
            skipped: 1,
            failed: 0
        }
    );
    assert_eq!(report.failures(), 0);
}
