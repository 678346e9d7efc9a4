//! The reconciler
//!
//! Drives a remote app resource to `present-and-deployed` (and reports
//! `running` when the platform already says so) in a fixed sequence of
//! idempotent steps: sync, existence check, create-or-update, deploy,
//! report. Stateless across invocations: every run re-observes the remote
//! state from scratch, so it is always safe to rerun after a failure.
//!
//! Callers must serialize invocations per app name; the check-then-act
//! window in step 3 is not protected against concurrent reconcilers.

use tokio_util::sync::CancellationToken;

use crate::config::{BackoffConfig, PlatformConfig, RetryConfig};
use crate::error::{CreateError, ReconcileError, SyncError};
use crate::retry::{with_retries, ExponentialBackoff};
use crate::traits::Platform;
use crate::types::{AppDescriptor, AppName, AppState, SyncResult};

/// What the create-or-update step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// The resource was created fresh
    Created,
    /// An existing resource was updated in place
    Updated,
}

/// Final report of a reconcile run
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The app this run reconciled
    pub name: AppName,
    /// Last observed state of the remote resource
    pub state: AppState,
    /// What step 3 did, if the run got that far
    pub action: Option<AppAction>,
    /// Sync report, if the run got that far
    pub sync: Option<SyncResult>,
    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

impl ReconcileOutcome {
    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        if self.cancelled {
            return format!(
                "app `{}`: cancelled before completion; last observed state: {}",
                self.name, self.state
            );
        }

        let mut parts = Vec::new();
        if let Some(sync) = &self.sync {
            parts.push(format!(
                "{} file(s) ({} bytes) synced",
                sync.files_transferred, sync.bytes_transferred
            ));
        }
        match self.action {
            Some(AppAction::Created) => parts.push("created".to_string()),
            Some(AppAction::Updated) => parts.push("updated".to_string()),
            None => {}
        }
        parts.push("deployed".to_string());

        format!(
            "app `{}`: {}; state: {}",
            self.name,
            parts.join(", "),
            self.state
        )
    }
}

/// Reconciles one app per invocation against a [`Platform`]
pub struct Reconciler<P> {
    platform: P,
    retry: RetryConfig,
    backoff: BackoffConfig,
    cancel: CancellationToken,
}

impl<P: Platform> Reconciler<P> {
    /// Create a reconciler with the retry/backoff policy from `config`
    pub fn new(platform: P, config: &PlatformConfig) -> Self {
        Self {
            platform,
            retry: config.retry.clone(),
            backoff: config.backoff.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token (e.g. wired to Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Drive the app described by `descriptor` to its target state
    ///
    /// Steps run strictly in sequence; the first failing step is returned
    /// immediately, wrapped with the step and app name. Cancellation is
    /// honored between steps (never mid-call) and yields a non-error
    /// outcome carrying the last observed state.
    pub async fn reconcile(
        &self,
        descriptor: &AppDescriptor,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let name = &descriptor.name;

        // Step 1: sync the bundle
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_outcome(name, AppState::Absent, None, None));
        }
        tracing::info!(
            app = %name,
            source = %descriptor.source_path.display(),
            remote = %descriptor.remote_path,
            "syncing bundle"
        );
        let sync = self
            .platform
            .sync_files(&descriptor.source_path, &descriptor.remote_path)
            .await
            .map_err(|source| ReconcileError::Sync {
                name: name.clone(),
                source,
            })?;
        if !sync.is_clean() {
            return Err(ReconcileError::Sync {
                name: name.clone(),
                source: SyncError::Partial { result: sync },
            });
        }
        tracing::info!(
            files = sync.files_transferred,
            bytes = sync.bytes_transferred,
            "sync complete"
        );

        // Step 2: existence check, with bounded retry for transient failures
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_outcome(name, AppState::Absent, None, Some(sync)));
        }
        let exists = with_retries(
            self.retry.exists_attempts,
            ExponentialBackoff::from_config(&self.backoff),
            || self.platform.app_exists(name),
        )
        .await
        .map_err(|source| ReconcileError::Query {
            name: name.clone(),
            attempts: self.retry.exists_attempts.max(1),
            source,
        })?;
        tracing::debug!(app = %name, exists, "existence check");

        // Step 3: create-or-update
        if self.cancel.is_cancelled() {
            let state = if exists {
                AppState::Created
            } else {
                AppState::Absent
            };
            return Ok(self.cancelled_outcome(name, state, None, Some(sync)));
        }
        let action = if exists {
            self.platform
                .update_app(name, &descriptor.description)
                .await
                .map_err(|source| ReconcileError::Create {
                    name: name.clone(),
                    source,
                })?;
            AppAction::Updated
        } else {
            match self.platform.create_app(name, &descriptor.description).await {
                Ok(()) => AppAction::Created,
                Err(CreateError::Duplicate(_)) => {
                    // The existence answer was stale (half-finished prior run);
                    // converge on update instead of failing.
                    tracing::debug!(app = %name, "create reported duplicate, updating instead");
                    self.platform
                        .update_app(name, &descriptor.description)
                        .await
                        .map_err(|source| ReconcileError::Create {
                            name: name.clone(),
                            source,
                        })?;
                    AppAction::Updated
                }
                Err(source) => {
                    return Err(ReconcileError::Create {
                        name: name.clone(),
                        source,
                    })
                }
            }
        };
        tracing::info!(app = %name, ?action, "resource reconciled");

        // Step 4: deploy. On failure the resource stays Created and the next
        // run resumes from there.
        if self.cancel.is_cancelled() {
            return Ok(self.cancelled_outcome(name, AppState::Created, Some(action), Some(sync)));
        }
        with_retries(
            self.retry.deploy_attempts,
            ExponentialBackoff::from_config(&self.backoff),
            || self.platform.deploy_app(name, &descriptor.remote_path),
        )
        .await
        .map_err(|source| ReconcileError::Deploy {
            name: name.clone(),
            state: AppState::Created,
            source,
        })?;
        tracing::info!(app = %name, remote = %descriptor.remote_path, "deployment triggered");

        // Step 5: report. Deployed is terminal success; upgrade to Running
        // only if the platform already says so. A status-query failure here
        // never fails the run.
        let mut state = AppState::Deployed;
        match self.platform.app_status(name).await {
            Ok(AppState::Running) => state = AppState::Running,
            Ok(observed) => tracing::debug!(app = %name, %observed, "post-deploy status"),
            Err(e) => tracing::warn!(app = %name, "post-deploy status query failed: {}", e),
        }

        Ok(ReconcileOutcome {
            name: name.clone(),
            state,
            action: Some(action),
            sync: Some(sync),
            cancelled: false,
        })
    }

    fn cancelled_outcome(
        &self,
        name: &AppName,
        state: AppState,
        action: Option<AppAction>,
        sync: Option<SyncResult>,
    ) -> ReconcileOutcome {
        tracing::warn!(app = %name, %state, "reconcile cancelled");
        ReconcileOutcome {
            name: name.clone(),
            state,
            action,
            sync,
            cancelled: true,
        }
    }
}
