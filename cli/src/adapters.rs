//! Concrete implementations of the core's collaborator ports, plus the
//! host-side preconditions the run depends on.

pub mod pve;
pub mod route;

use std::process::Command;

/// True when `name` resolves on PATH.
pub fn command_available(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
