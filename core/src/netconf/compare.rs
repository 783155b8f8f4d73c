//! Idempotence check: does the persisted config already carry the desired
//! address, prefix and gateway?
//!
//! Equality is exact on the raw token text: `ip=` and `gw=` values must
//! equal the canonical rendering of the desired state, with no semantic
//! subnet equivalence. A byte-identical config never triggers a rewrite
//! (and the restart that comes with it); anything else does.

use std::net::Ipv4Addr;

use ipanchor_common::network::intent::{ResolvedConfig, TargetAddress};
use ipanchor_common::workload::WorkloadKind;

use crate::netconf::line::ConfigDoc;

/// Verdict of the comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigState {
    AlreadyCorrect,
    NeedsUpdate,
}

/// Current (address, gateway) parsed from the primary network field.
///
/// `None` when the field, the `ip=` token, a well-formed CIDR value, or a
/// well-formed gateway is absent. Absence of valid state is not an error,
/// it simply needs an update.
pub fn current_config(text: &str, kind: WorkloadKind) -> Option<ResolvedConfig> {
    let doc = ConfigDoc::parse(text);
    let value = doc.field(kind.net_field())?;

    let mut address: Option<TargetAddress> = None;
    let mut gateway: Option<Ipv4Addr> = None;
    for token in value.split(',').map(str::trim) {
        if let Some(cidr) = token.strip_prefix("ip=") {
            if address.is_none() {
                address = parse_cidr(cidr);
            }
        } else if let Some(addr) = token.strip_prefix("gw=") {
            if gateway.is_none() {
                gateway = addr.parse().ok();
            }
        }
    }

    Some(ResolvedConfig {
        address: address?,
        gateway: gateway?,
    })
}

/// Exact comparison against the desired state.
///
/// `AlreadyCorrect` requires the `ip=` token to spell the desired CIDR
/// exactly and exactly one well-formed `gw=` token spelling the desired
/// gateway. Tokens whose value is not a well-formed dotted-quad/CIDR are
/// ignored, matching what [`mutate::apply`](super::mutate::apply) leaves
/// in place.
pub fn compare(text: &str, kind: WorkloadKind, desired: &ResolvedConfig) -> ConfigState {
    let doc = ConfigDoc::parse(text);
    let Some(value) = doc.field(kind.net_field()) else {
        return ConfigState::NeedsUpdate;
    };

    let want_ip = format!("ip={}", desired.address);
    let want_gw = format!("gw={}", desired.gateway);

    let tokens: Vec<&str> = value.split(',').map(str::trim).collect();
    let ip = tokens
        .iter()
        .copied()
        .find(|t| t.strip_prefix("ip=").is_some_and(|v| parse_cidr(v).is_some()));
    let gateways: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| {
            t.strip_prefix("gw=")
                .is_some_and(|v| v.parse::<Ipv4Addr>().is_ok())
        })
        .collect();

    match (ip, gateways.as_slice()) {
        (Some(ip), [gw]) if ip == want_ip && *gw == want_gw => ConfigState::AlreadyCorrect,
        _ => ConfigState::NeedsUpdate,
    }
}

/// `<dotted-quad>/<prefix>` with a plausible prefix length.
fn parse_cidr(value: &str) -> Option<TargetAddress> {
    let (addr, prefix) = value.split_once('/')?;
    let addr: Ipv4Addr = addr.parse().ok()?;
    let prefix_bits: u8 = prefix.parse().ok()?;
    (prefix_bits <= 32).then_some(TargetAddress { addr, prefix_bits })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
