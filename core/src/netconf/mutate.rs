//! Minimal rewrite of the primary network field.
//!
//! The transformation is token-wise and idempotent for a fixed desired
//! state: stale `gw=` tokens are dropped, the `ip=` token is replaced in
//! place (substituting the `dhcp` sentinel when present), and the desired
//! gateway is inserted immediately after it. Every other token, and every
//! other line of the file, keeps its bytes.

use std::net::Ipv4Addr;

use ipanchor_common::error::ConfigError;
use ipanchor_common::network::intent::ResolvedConfig;
use ipanchor_common::workload::WorkloadKind;

use crate::netconf::line::{self, token_key};

/// Computes the new config text for `desired`.
///
/// A config without the primary network field is not rewritten at all:
/// that is [`ConfigError::MissingInterfaceField`], a malformed/unsupported
/// config shape, distinct from "already correct".
pub fn apply(
    text: &str,
    kind: WorkloadKind,
    desired: &ResolvedConfig,
) -> Result<String, ConfigError> {
    let field = kind.net_field();
    line::rewrite_field(text, field, |value| rewrite_tokens(value, desired))
        .ok_or(ConfigError::MissingInterfaceField(field))
}

fn rewrite_tokens(value: &str, desired: &ResolvedConfig) -> String {
    let ip_token = format!("ip={}", desired.address);
    let gw_token = format!("gw={}", desired.gateway);

    // Every gateway clause goes, stale or duplicated alike.
    let mut tokens: Vec<String> = value
        .split(',')
        .filter(|token| !is_gateway_clause(token))
        .map(str::to_string)
        .collect();

    // The sentinel (`ip=dhcp`) and a static address are replaced the same
    // way: the whole token becomes the desired CIDR.
    let ip_index = match tokens.iter().position(|t| token_key(t.trim()) == "ip") {
        Some(index) => {
            tokens[index] = ip_token;
            index
        }
        None => {
            tokens.push(ip_token);
            tokens.len() - 1
        }
    };

    // The gateway sits immediately after the address token.
    tokens.insert(ip_index + 1, gw_token);

    tokens.join(",")
}

/// A `gw=<dotted-quad>` token. Anything else under the `gw` key is left
/// alone, matching what the comparator ignores.
fn is_gateway_clause(token: &str) -> bool {
    let token = token.trim();
    token_key(token) == "gw"
        && token
            .strip_prefix("gw=")
            .is_some_and(|v| v.parse::<Ipv4Addr>().is_ok())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
