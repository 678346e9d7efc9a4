//! dh-platform: Workspace platform CLI adapter
//!
//! Implements `dh_core::Platform` by shelling out to the platform's own
//! command-line tool. All remote knowledge (credentials, endpoints, sync
//! mechanics) stays in that tool; this crate owns invocation, JSON output
//! parsing, and error classification.

pub mod client;
pub mod runner;

pub use client::PlatformCli;
pub use runner::{CommandOutput, CommandRunner};
