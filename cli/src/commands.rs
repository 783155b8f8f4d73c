use std::net::Ipv4Addr;

use clap::Parser;
use clap::error::ErrorKind;

#[derive(Parser)]
#[command(name = "ipanchor")]
#[command(about = "Bulk static IP assignment for Proxmox guests.")]
pub struct CommandLine {
    /// Gateway address written into every guest config
    #[arg(short, long, conflicts_with = "auto")]
    pub gateway: Option<Ipv4Addr>,

    /// Netmask as a dotted quad or a prefix length (octet-aligned)
    #[arg(short, long, default_value = "255.255.255.0")]
    pub netmask: String,

    /// Detect gateway and netmask from the host's default route
    #[arg(short, long)]
    pub auto: bool,

    /// Compute and report changes without writing or restarting anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub assume_yes: bool,
}

impl CommandLine {
    /// Parses the process arguments, exiting 0 for help output and 1 for
    /// flag validation failures.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(commands) => commands,
            Err(err)
                if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
            {
                let _ = err.print();
                std::process::exit(0);
            }
            Err(err) => {
                let _ = err.print();
                std::process::exit(1);
            }
        }
    }
}
