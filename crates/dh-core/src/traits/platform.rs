//! Platform trait

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use crate::error::{CreateError, DeployError, PlatformError, QueryError, SyncError};
use crate::types::{AppName, AppState, LogLine, SyncResult};

/// Abstraction over the workspace platform's CLI/API surface
///
/// The reconciler only talks to the platform through this trait, so it can
/// be exercised against a fake in tests. The production implementation
/// shells out to the platform CLI.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Transfer all files under `local` to the workspace path `remote`.
    ///
    /// Idempotent: re-running with no local changes transfers nothing.
    /// Files copied before a failure stay copied.
    async fn sync_files(&self, local: &Path, remote: &str) -> Result<SyncResult, SyncError>;

    /// Whether an app resource named `name` exists
    ///
    /// May fail transiently; callers retry via the bounded-retry helper.
    async fn app_exists(&self, name: &AppName) -> Result<bool, QueryError>;

    /// Create the app resource; fails with `CreateError::Duplicate` if the
    /// name is already taken
    async fn create_app(&self, name: &AppName, description: &str) -> Result<(), CreateError>;

    /// Update the description/metadata of an existing app in place
    async fn update_app(&self, name: &AppName, description: &str) -> Result<(), CreateError>;

    /// Trigger a deployment of `remote` into the named app
    async fn deploy_app(&self, name: &AppName, remote: &str) -> Result<(), DeployError>;

    /// Start the app's compute
    async fn start_app(&self, name: &AppName) -> Result<(), PlatformError>;

    /// Stop the app's compute
    async fn stop_app(&self, name: &AppName) -> Result<(), PlatformError>;

    /// Observed state of the app
    async fn app_status(&self, name: &AppName) -> Result<AppState, QueryError>;

    /// Stream app log lines; infinite when `follow` is true, restartable
    /// only by reissuing the call
    async fn app_logs(
        &self,
        name: &AppName,
        follow: bool,
        tail_lines: u32,
    ) -> Result<mpsc::Receiver<LogLine>, QueryError>;
}
