use std::fmt::Display;

use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use ipanchor_common::workload::Workload;
use ipanchor_core::engine::{RunReport, Tally, WorkloadOutcome};

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 10;

pub fn print(msg: &str) {
    info!(target: "ipanchor::print", "{msg}");
}

pub fn banner() {
    let text_content: String = format!("⟦ IPANCHOR v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .bright_black();
    print(&format!("{sep}{text}{sep}"));
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn aligned_line<V: Display>(key: &str, value: V) {
    let dots: String = ".".repeat((KEY_WIDTH + 1).saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".bright_black(),
        key.cyan(),
        dots.bright_black(),
        ":".bright_black(),
        value
    ));
}

/// One line per workload, emitted as soon as its outcome is known.
pub fn outcome_line(workload: &Workload, outcome: &WorkloadOutcome) {
    let tag: ColoredString = format!("[{} {}]", workload.kind.label(), workload.id).cyan();
    let line: String = match outcome {
        WorkloadOutcome::Updated {
            target, restarted, ..
        } => {
            let restart_note = if *restarted { ", restarted" } else { ", not running" };
            format!(
                "{tag} {} {}{}",
                "updated to".green(),
                target.to_string().green().bold(),
                restart_note.bright_black()
            )
        }
        WorkloadOutcome::AlreadyCorrect { target } => {
            format!("{tag} already at {}", target.to_string().bold()).dimmed().to_string()
        }
        WorkloadOutcome::WouldUpdate { target, previous } => {
            let from: String = match previous {
                Some(previous) => previous.to_string(),
                None => "dynamic/unset".to_string(),
            };
            format!(
                "{tag} {} {} (currently {})",
                "would set".yellow(),
                target.to_string().yellow().bold(),
                from
            )
        }
        WorkloadOutcome::Skipped(reason) => {
            format!("{tag} {} {reason}", "skipped:".yellow())
        }
        WorkloadOutcome::Failed(err) => {
            format!("{tag} {} {err:#}", "error:".red().bold())
        }
    };
    print(&line);
}

pub fn summary(report: &RunReport) {
    header("run summary");
    tally_line("Containers", &report.containers);
    tally_line("VMs", &report.vms);

    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

fn tally_line(name: &str, tally: &Tally) {
    let counts: String = format!(
        "{} updated, {} unchanged, {} skipped, {} failed",
        tally.updated.to_string().green().bold(),
        tally.unchanged,
        tally.skipped.to_string().yellow(),
        tally.failed.to_string().red().bold(),
    );
    aligned_line(name, counts);
}
