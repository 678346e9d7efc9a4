//! Platform CLI client
//!
//! One method per remote operation, each a single invocation of the
//! platform CLI. Exit status and stderr are classified into the error
//! taxonomy here; unknown stderr always rides along as the error cause,
//! never swallowed.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::mpsc;

use dh_core::config::PlatformConfig;
use dh_core::error::{CreateError, DeployError, PlatformError, QueryError, SyncError};
use dh_core::traits::Platform;
use dh_core::types::{AppName, AppState, LogLine, SyncFailure, SyncResult};

use crate::runner::{CommandOutput, CommandRunner};

/// Production [`Platform`] implementation over the platform CLI
#[derive(Debug, Clone)]
pub struct PlatformCli {
    runner: CommandRunner,
}

impl PlatformCli {
    /// Create a client from platform configuration
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            runner: CommandRunner::new(config),
        }
    }

    fn command_failed(&self, args: &[&str], output: &CommandOutput) -> PlatformError {
        PlatformError::CommandFailed {
            command: self.runner.describe(args),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        }
    }
}

#[async_trait]
impl Platform for PlatformCli {
    async fn sync_files(&self, local: &Path, remote: &str) -> Result<SyncResult, SyncError> {
        let local = local.to_string_lossy();
        let args = ["sync", local.as_ref(), remote, "--output", "json"];
        let output = self.runner.run(&args).await?;

        let result = tally_sync_events(&output.stdout);
        if !output.success() && result.errors.is_empty() {
            // Nothing file-level to report, the command itself failed
            return Err(SyncError::Platform(self.command_failed(&args, &output)));
        }
        Ok(result)
    }

    async fn app_exists(&self, name: &AppName) -> Result<bool, QueryError> {
        let args = ["apps", "get", name.as_str(), "--output", "json"];
        let output = self.runner.run(&args).await.map_err(classify_query)?;

        if output.success() {
            return Ok(true);
        }
        if is_not_found(&output.stderr) {
            return Ok(false);
        }

        let err = self.command_failed(&args, &output);
        if is_transient(&output.stderr) {
            Err(QueryError::Transient(err))
        } else {
            Err(QueryError::Platform(err))
        }
    }

    async fn create_app(&self, name: &AppName, description: &str) -> Result<(), CreateError> {
        let args = ["apps", "create", name.as_str(), "--description", description];
        let output = self.runner.run(&args).await?;

        if output.success() {
            return Ok(());
        }
        if is_already_exists(&output.stderr) {
            return Err(CreateError::Duplicate(name.clone()));
        }
        Err(CreateError::Platform(self.command_failed(&args, &output)))
    }

    async fn update_app(&self, name: &AppName, description: &str) -> Result<(), CreateError> {
        let args = ["apps", "update", name.as_str(), "--description", description];
        let output = self.runner.run(&args).await?;

        if output.success() {
            return Ok(());
        }
        Err(CreateError::Platform(self.command_failed(&args, &output)))
    }

    async fn deploy_app(&self, name: &AppName, remote: &str) -> Result<(), DeployError> {
        let args = [
            "apps",
            "deploy",
            name.as_str(),
            "--source-code-path",
            remote,
            "--output",
            "json",
        ];
        let output = self.runner.run(&args).await.map_err(classify_deploy)?;

        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr.trim();
        if is_transient(stderr) {
            return Err(DeployError::Transient(self.command_failed(&args, &output)));
        }
        if !stderr.is_empty() {
            // The call reached the platform and the platform said no
            return Err(DeployError::Rejected {
                reason: stderr.lines().next().unwrap_or(stderr).to_string(),
            });
        }
        Err(DeployError::Platform(self.command_failed(&args, &output)))
    }

    async fn start_app(&self, name: &AppName) -> Result<(), PlatformError> {
        let args = ["apps", "start", name.as_str()];
        let output = self.runner.run(&args).await?;
        if output.success() {
            return Ok(());
        }
        Err(self.command_failed(&args, &output))
    }

    async fn stop_app(&self, name: &AppName) -> Result<(), PlatformError> {
        let args = ["apps", "stop", name.as_str()];
        let output = self.runner.run(&args).await?;
        if output.success() {
            return Ok(());
        }
        Err(self.command_failed(&args, &output))
    }

    async fn app_status(&self, name: &AppName) -> Result<AppState, QueryError> {
        let args = ["apps", "get", name.as_str(), "--output", "json"];
        let output = self.runner.run(&args).await.map_err(classify_query)?;

        if !output.success() {
            if is_not_found(&output.stderr) {
                return Ok(AppState::Absent);
            }
            let err = self.command_failed(&args, &output);
            if is_transient(&output.stderr) {
                return Err(QueryError::Transient(err));
            }
            return Err(QueryError::Platform(err));
        }

        let doc: AppDocument =
            serde_json::from_str(&output.stdout).map_err(|source| PlatformError::Parse {
                command: self.runner.describe(&args),
                source,
            })?;

        // An app with no status block exists but has never been deployed
        Ok(doc
            .app_status
            .map(|status| AppState::from_platform_state(&status.state))
            .unwrap_or(AppState::Created))
    }

    async fn app_logs(
        &self,
        name: &AppName,
        follow: bool,
        tail_lines: u32,
    ) -> Result<mpsc::Receiver<LogLine>, QueryError> {
        let tail = tail_lines.to_string();
        let mut args = vec!["apps", "logs", name.as_str(), "--tail", &tail];
        if follow {
            args.push("--follow");
        }
        self.runner.stream(&args).await.map_err(classify_query)
    }
}

/// App document returned by `apps get --output json`
#[derive(Debug, Deserialize)]
struct AppDocument {
    #[serde(default)]
    app_status: Option<AppStatusBlock>,
}

#[derive(Debug, Deserialize)]
struct AppStatusBlock {
    state: String,
}

/// One line of `sync --output json` progress output
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SyncEvent {
    Uploaded {
        path: String,
        #[serde(default)]
        bytes: u64,
    },
    Deleted {
        path: String,
    },
    Error {
        path: String,
        message: String,
    },
    Complete {
        #[serde(default)]
        files: u64,
        #[serde(default)]
        bytes: u64,
    },
}

/// Tally line-delimited sync events into a [`SyncResult`]
///
/// Unparseable lines are progress noise and skipped. A `complete` summary
/// event, when present, is authoritative for the totals.
fn tally_sync_events(stdout: &str) -> SyncResult {
    let mut result = SyncResult::default();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: SyncEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(_) => continue,
        };
        match event {
            SyncEvent::Uploaded { bytes, .. } => {
                result.files_transferred += 1;
                result.bytes_transferred += bytes;
            }
            SyncEvent::Deleted { path } => {
                tracing::debug!(%path, "removed from remote");
            }
            SyncEvent::Error { path, message } => {
                result.errors.push(SyncFailure {
                    path,
                    cause: message,
                });
            }
            SyncEvent::Complete { files, bytes } => {
                result.files_transferred = files;
                result.bytes_transferred = bytes;
            }
        }
    }
    result
}

/// Stderr markers for a missing resource
fn is_not_found(stderr: &str) -> bool {
    let s = stderr.to_ascii_lowercase();
    s.contains("does not exist")
        || s.contains("not found")
        || s.contains("resource_does_not_exist")
}

/// Stderr markers for a duplicate-name conflict
fn is_already_exists(stderr: &str) -> bool {
    let s = stderr.to_ascii_lowercase();
    s.contains("already exists") || s.contains("resource_already_exists")
}

/// Stderr markers the platform documents as retryable
fn is_transient(stderr: &str) -> bool {
    let s = stderr.to_ascii_lowercase();
    s.contains("temporarily unavailable")
        || s.contains("temporarily_unavailable")
        || s.contains("rate limit")
        || s.contains("too many requests")
        || s.contains("429")
        || s.contains("timed out")
        || s.contains("connection reset")
}

/// A timed-out or otherwise inconclusive invocation is a transient query
fn classify_query(err: PlatformError) -> QueryError {
    match err {
        PlatformError::TimedOut { .. } => QueryError::Transient(err),
        other => QueryError::Platform(other),
    }
}

fn classify_deploy(err: PlatformError) -> DeployError {
    match err {
        PlatformError::TimedOut { .. } => DeployError::Transient(err),
        other => DeployError::Platform(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_uploads() {
        let stdout = r#"
            {"type":"uploaded","path":"app.py","bytes":2048}
            {"type":"uploaded","path":"assets/style.css","bytes":512}
        "#;
        let result = tally_sync_events(stdout);
        assert_eq!(result.files_transferred, 2);
        assert_eq!(result.bytes_transferred, 2560);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_tally_collects_errors_in_order() {
        let stdout = r#"
            {"type":"uploaded","path":"app.py","bytes":2048}
            {"type":"error","path":"assets/logo.png","message":"permission denied"}
            {"type":"error","path":"assets/font.woff","message":"file too large"}
        "#;
        let result = tally_sync_events(stdout);
        assert_eq!(result.files_transferred, 1);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].path, "assets/logo.png");
        assert_eq!(result.errors[1].path, "assets/font.woff");
    }

    #[test]
    fn test_tally_complete_event_is_authoritative() {
        let stdout = r#"
            {"type":"uploaded","path":"app.py","bytes":2048}
            {"type":"complete","files":12,"bytes":34567}
        "#;
        let result = tally_sync_events(stdout);
        assert_eq!(result.files_transferred, 12);
        assert_eq!(result.bytes_transferred, 34567);
    }

    #[test]
    fn test_tally_skips_progress_noise() {
        let stdout = "Uploading bundle...\n{\"type\":\"uploaded\",\"path\":\"app.py\"}\nnot json\n";
        let result = tally_sync_events(stdout);
        assert_eq!(result.files_transferred, 1);
        // bytes defaults to zero when the event omits it
        assert_eq!(result.bytes_transferred, 0);
    }

    #[test]
    fn test_empty_sync_output_is_clean() {
        let result = tally_sync_events("");
        assert_eq!(result.files_transferred, 0);
        assert!(result.is_clean());
    }

    #[test]
    fn test_not_found_markers() {
        assert!(is_not_found("Error: app 'iot-dash' does not exist"));
        assert!(is_not_found("RESOURCE_DOES_NOT_EXIST: no such app"));
        assert!(!is_not_found("Error: permission denied"));
    }

    #[test]
    fn test_already_exists_markers() {
        assert!(is_already_exists("Error: app 'iot-dash' already exists"));
        assert!(is_already_exists("RESOURCE_ALREADY_EXISTS"));
        assert!(!is_already_exists("Error: quota exceeded"));
    }

    #[test]
    fn test_transient_markers() {
        assert!(is_transient("Error: 429 Too Many Requests"));
        assert!(is_transient("service temporarily unavailable"));
        assert!(is_transient("request timed out"));
        assert!(!is_transient("Error: invalid bundle"));
    }

    #[test]
    fn test_app_document_parse() {
        let doc: AppDocument = serde_json::from_str(
            r#"{"name":"iot-dash","app_status":{"state":"RUNNING","message":"ok"}}"#,
        )
        .unwrap();
        assert_eq!(
            AppState::from_platform_state(&doc.app_status.unwrap().state),
            AppState::Running
        );
    }

    #[test]
    fn test_app_document_without_status_block() {
        let doc: AppDocument = serde_json::from_str(r#"{"name":"iot-dash"}"#).unwrap();
        assert!(doc.app_status.is_none());
    }

    #[test]
    fn test_classify_query_timeout_is_transient() {
        let err = classify_query(PlatformError::TimedOut {
            command: "platform apps get iot-dash".to_string(),
            secs: 120,
        });
        assert!(err.is_transient());
    }
}
