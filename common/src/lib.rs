//! # ipanchor-common
//!
//! Shared domain models for the ipanchor workspace: subnets, the desired
//! network state, and the workload vocabulary. Pure data and parsing, no
//! IO. The `core` crate owns the decision logic and `cli` owns every side
//! effect.

pub mod config;
pub mod error;
pub mod network;
pub mod workload;
