//! dh-core: Core abstractions and the reconciler for deckhand
//!
//! This crate provides the domain types, configuration, error taxonomy,
//! the `Platform` trait (the seam to the workspace platform's CLI), and
//! the reconciler that drives an app resource to its target state.

pub mod config;
pub mod error;
pub mod reconcile;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::{ArgumentError, ReconcileError};
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use traits::Platform;
pub use types::{AppDescriptor, AppName, AppState, SyncResult};
