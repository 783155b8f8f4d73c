//! # ipanchor-core
//!
//! The IP-resolution and config-mutation engine.
//!
//! ## Architecture Overview
//! * **[`ports`]**: Traits for every interaction with the outside world
//!   (hypervisor tools, config files). Trait-only boundary.
//! * **[`resolver`]**: Decides each workload's target address, tags first,
//!   live introspection as fallback.
//! * **[`netconf`]**: Parses and rewrites the persisted guest config,
//!   touching nothing but the primary network field.
//! * **[`engine`]**: Sequential per-workload orchestration; outcomes are
//!   returned to the caller and folded into a run report.
//!
//! Concrete port implementations live in `ipanchor-cli`; tests inject
//! in-memory fakes.

pub mod engine;
pub mod netconf;
pub mod ports;
pub mod resolver;
