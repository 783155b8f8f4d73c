//! Live guest interface addresses, as reported by the introspection
//! channels (in-container shell listing, VM guest agent).

use std::net::IpAddr;

/// One address observed on one guest interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub addr: IpAddr,
}

impl InterfaceAddress {
    pub fn new(name: impl Into<String>, addr: IpAddr) -> Self {
        Self {
            name: name.into(),
            addr,
        }
    }
}
