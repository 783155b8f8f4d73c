mod adapters;
mod commands;
mod terminal;

use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};

use commands::CommandLine;
use ipanchor_common::config::RunConfig;
use ipanchor_common::network::intent::NetworkIntent;
use ipanchor_core::engine::{Engine, RunReport};

use crate::adapters::pve::Pve;
use crate::adapters::route;
use crate::terminal::{input, logging, print, spinner};

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init();
    print::banner();

    match run(commands).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(commands: CommandLine) -> anyhow::Result<ExitCode> {
    preconditions()?;

    let intent = build_intent(&commands)?;
    let cfg = RunConfig {
        dry_run: commands.dry_run,
        assume_yes: commands.assume_yes,
    };

    print::header("target network state");
    print::aligned_line("Gateway", intent.gateway());
    print::aligned_line("Subnet", intent.subnet());
    print::aligned_line("Mode", if cfg.dry_run { "dry run" } else { "apply" });

    if !cfg.dry_run && !cfg.assume_yes {
        let proceed = input::confirm("Rewrite guest configs and restart running guests?")?;
        if !proceed {
            info!("aborted by operator, nothing was touched");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let pve = Pve::new();
    let engine = Engine {
        status: &pve,
        containers: &pve,
        agent: &pve,
        store: &pve,
        lifecycle: &pve,
    };

    let workloads = engine.discover().await?;
    info!("{} guest configs found", workloads.len());

    let mut report = RunReport::default();
    for workload in &workloads {
        spinner::status(format!(
            "Processing {} {}...",
            workload.kind.label(),
            workload.id
        ));
        let outcome = engine.process(workload, &intent, &cfg).await;
        report.record(workload.kind, &outcome);
        print::outcome_line(workload, &outcome);
    }
    spinner::finish();

    print::summary(&report);

    Ok(if report.failures() > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Fatal environment checks, all before any guest is touched.
fn preconditions() -> anyhow::Result<()> {
    if !is_root::is_root() {
        anyhow::bail!("must run as root to rewrite guest configs");
    }
    for tool in ["pct", "qm"] {
        if !adapters::command_available(tool) {
            anyhow::bail!("required hypervisor tool `{tool}` not found in PATH");
        }
    }
    Ok(())
}

fn build_intent(commands: &CommandLine) -> anyhow::Result<NetworkIntent> {
    if commands.auto {
        let detected = route::detect_default_route()?;
        info!(
            "auto-detected gateway {} with a /{} netmask",
            detected.gateway, detected.prefix_bits
        );
        return Ok(NetworkIntent::derive(
            detected.gateway,
            &detected.prefix_bits.to_string(),
        )?);
    }

    let gateway = commands
        .gateway
        .context("either --gateway or --auto is required")?;
    Ok(NetworkIntent::derive(gateway, &commands.netmask)?)
}
