//! Deploy command implementation

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use dh_core::config::PlatformConfig;
use dh_core::error::{ReconcileError, SyncError, EXIT_INVALID_ARGS};
use dh_core::{AppDescriptor, Reconciler};
use dh_platform::PlatformCli;

use crate::output::{format_sync_failures, print_error, print_success, print_warning};

/// Execute the deploy command; returns the process exit code
///
/// 0 on success (state deployed or running), 1/2/3 per failing step,
/// 4 for invalid arguments. Arguments are validated before any remote
/// call is made.
pub async fn deploy_command(
    config: &PlatformConfig,
    cancel: CancellationToken,
    name: &str,
    source: PathBuf,
    remote: &str,
    description: &str,
) -> i32 {
    let descriptor = match AppDescriptor::new(name, source, remote, description) {
        Ok(d) => d,
        Err(e) => {
            print_error(&e.to_string());
            return EXIT_INVALID_ARGS;
        }
    };

    let platform = PlatformCli::new(config);
    let reconciler = Reconciler::new(platform, config).with_cancellation(cancel);

    match reconciler.reconcile(&descriptor).await {
        Ok(outcome) if outcome.cancelled => {
            print_warning(&outcome.summary());
            0
        }
        Ok(outcome) => {
            print_success(&outcome.summary());
            0
        }
        Err(e) => {
            print_error(&e.to_string());
            if let ReconcileError::Sync {
                source: SyncError::Partial { result },
                ..
            } = &e
            {
                eprintln!("{}", format_sync_failures(result));
            }
            if matches!(e, ReconcileError::Deploy { .. }) {
                print_warning("rerun the same command to retry; the app does not need re-creating");
            }
            e.exit_code()
        }
    }
}
