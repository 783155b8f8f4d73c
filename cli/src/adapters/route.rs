//! Default-route introspection for `--auto` mode.
//!
//! The gateway and outbound device come from `ip -4 route show default`;
//! the netmask is read off that device's address via pnet. Any missing
//! piece is a fatal precondition, reported before the run starts.

use std::net::Ipv4Addr;
use std::process::Command;

use anyhow::{Context, bail};
use pnet::datalink;
use pnet::ipnetwork::IpNetwork;

/// Gateway and prefix length of the host's default route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetectedRoute {
    pub gateway: Ipv4Addr,
    pub prefix_bits: u8,
}

pub fn detect_default_route() -> anyhow::Result<DetectedRoute> {
    let output = Command::new("ip")
        .args(["-4", "route", "show", "default"])
        .output()
        .context("running `ip -4 route show default`")?;
    if !output.status.success() {
        bail!("`ip route` exited with {}", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (gateway, device) = parse_default_route(&stdout)
        .context("no default route found, cannot auto-detect the gateway")?;
    let prefix_bits = device_prefix(&device)
        .with_context(|| format!("no IPv4 network on default-route device `{device}`"))?;

    Ok(DetectedRoute {
        gateway,
        prefix_bits,
    })
}

/// Extracts (gateway, device) from `default via 192.168.0.1 dev vmbr0 ...`.
fn parse_default_route(output: &str) -> Option<(Ipv4Addr, String)> {
    let line = output
        .lines()
        .find(|line| line.trim_start().starts_with("default"))?;
    let words: Vec<&str> = line.split_whitespace().collect();

    let gateway: Ipv4Addr = words
        .iter()
        .position(|w| *w == "via")
        .and_then(|i| words.get(i + 1))
        .and_then(|w| w.parse().ok())?;
    let device = words
        .iter()
        .position(|w| *w == "dev")
        .and_then(|i| words.get(i + 1))?
        .to_string();

    Some((gateway, device))
}

fn device_prefix(device: &str) -> Option<u8> {
    datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == device)?
        .ips
        .iter()
        .find_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.prefix()),
            IpNetwork::V6(_) => None,
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_route_line_parses() {
        let output = "default via 192.168.0.1 dev vmbr0 proto kernel onlink\n";
        assert_eq!(
            parse_default_route(output),
            Some(("192.168.0.1".parse().unwrap(), "vmbr0".to_string()))
        );
    }

    #[test]
    fn first_default_route_wins() {
        let output = "\
default via 10.0.0.1 dev eth0 metric 100
default via 10.0.0.2 dev eth1 metric 200
";
        assert_eq!(
            parse_default_route(output),
            Some(("10.0.0.1".parse().unwrap(), "eth0".to_string()))
        );
    }

    #[test]
    fn missing_route_is_none() {
        assert_eq!(parse_default_route(""), None);
        assert_eq!(parse_default_route("10.0.0.0/24 dev eth0 scope link\n"), None);
    }

    #[test]
    fn route_without_device_is_none() {
        assert_eq!(parse_default_route("default via 10.0.0.1\n"), None);
    }
}
