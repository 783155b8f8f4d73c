use thiserror::Error;

/// Validation failures while deriving the run's network intent.
///
/// All of these are fatal preconditions: the run aborts before any guest
/// is touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("invalid netmask `{0}`: expected a dotted-quad mask or a prefix length")]
    UnparsableNetmask(String),
    #[error("netmask `{0}` has non-contiguous set bits")]
    NonContiguousMask(String),
    #[error("unsupported netmask /{0}: only octet-aligned prefixes (8, 16, 24, 32) are supported")]
    NotOctetAligned(u8),
}

/// The persisted guest config cannot be mutated.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Distinct from "already correct": the config has no primary network
    /// field to rewrite at all.
    #[error("no `{0}:` field in the guest config")]
    MissingInterfaceField(&'static str),
}
