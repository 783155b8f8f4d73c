//! Tag-pinned addresses. A guest tag list like `web;192.168.0.42;prod`
//! optionally carries one literal address inside the managed subnet.

use std::net::Ipv4Addr;

use ipanchor_common::network::subnet::SubnetSpec;

/// First tag that is an IPv4 literal inside `subnet`, in list order.
/// Empty or absent tag fields resolve to nothing, never to an error.
pub(crate) fn first_tag_address(
    tags_field: Option<&str>,
    subnet: &SubnetSpec,
) -> Option<Ipv4Addr> {
    subnet.first_match(tags_field?.split(';'))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
