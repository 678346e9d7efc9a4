//! deckhand: Command-line interface
//!
//! Provides the `deckhand` CLI for deploying app bundles to a workspace
//! platform and for the start/stop/status/logs pass-through operations.

pub mod commands;
pub mod output;
