//! Error taxonomy for deckhand
//!
//! Each reconcile step has its own error type wrapping the shared
//! `PlatformError`; `ReconcileError` ties a step failure to the app it
//! happened on and carries the exit-code mapping for the CLI.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{AppName, AppState, SyncResult};

/// Failure invoking the platform CLI itself
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The CLI binary could not be spawned
    #[error("failed to run `{bin}`: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    /// The CLI did not finish within the configured timeout
    #[error("`{command}` timed out after {secs}s")]
    TimedOut { command: String, secs: u64 },

    /// The CLI exited non-zero
    #[error("`{command}` failed{}: {stderr}", exit_code_suffix(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The CLI produced output that could not be parsed
    #[error("unparseable output from `{command}`: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

fn exit_code_suffix(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (exit {})", c),
        None => String::new(),
    }
}

/// Sync step failure; files already copied are not rolled back
#[derive(Error, Debug)]
pub enum SyncError {
    /// Some files transferred, some did not
    #[error("{} file(s) failed to transfer ({} transferred before failure)",
        .result.errors.len(), .result.files_transferred)]
    Partial { result: SyncResult },

    /// The sync command itself failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Existence/status query failure
#[derive(Error, Debug)]
pub enum QueryError {
    /// A failure the platform reports as retryable (throttling, availability)
    #[error("transient platform failure: {0}")]
    Transient(#[source] PlatformError),

    /// A non-retryable query failure
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The platform answered, but not in a shape we recognize
    #[error("unexpected response from platform CLI: {0}")]
    Malformed(String),
}

impl QueryError {
    /// Whether the bounded-retry helper should retry this failure
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::Transient(_))
    }
}

/// Create/update step failure
#[derive(Error, Debug)]
pub enum CreateError {
    /// The name is already taken (strict-policy duplicate)
    #[error("app `{0}` already exists")]
    Duplicate(AppName),

    /// The create or update call itself failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Deploy step failure
#[derive(Error, Debug)]
pub enum DeployError {
    /// The platform rejected the bundle (size limit, malformed, quota)
    #[error("bundle rejected by platform: {reason}")]
    Rejected { reason: String },

    /// A failure the platform reports as retryable
    #[error("transient platform failure: {0}")]
    Transient(#[source] PlatformError),

    /// The deploy call itself failed
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl DeployError {
    /// Whether the optional deploy retry should retry this failure
    pub fn is_transient(&self) -> bool {
        matches!(self, DeployError::Transient(_))
    }
}

/// Top-level reconcile failure: step error plus the app it happened on
///
/// No step swallows or downgrades an error from a later step; whichever
/// step fails first is returned to the caller immediately.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Step 1 failed; partial transfer is reported, not rolled back
    #[error("sync failed for app `{name}`: {source}")]
    Sync {
        name: AppName,
        #[source]
        source: SyncError,
    },

    /// Step 2 failed after the retry budget was exhausted
    #[error("existence check failed for app `{name}` after {attempts} attempt(s): {source}")]
    Query {
        name: AppName,
        attempts: u32,
        #[source]
        source: QueryError,
    },

    /// Step 3 failed
    #[error("create/update failed for app `{name}`: {source}")]
    Create {
        name: AppName,
        #[source]
        source: CreateError,
    },

    /// Step 4 failed; the resource remains in `state` for a future retry
    #[error("deploy failed for app `{name}` (app remains {state}): {source}")]
    Deploy {
        name: AppName,
        state: AppState,
        #[source]
        source: DeployError,
    },
}

impl ReconcileError {
    /// The app this failure belongs to
    pub fn app_name(&self) -> &AppName {
        match self {
            ReconcileError::Sync { name, .. }
            | ReconcileError::Query { name, .. }
            | ReconcileError::Create { name, .. }
            | ReconcileError::Deploy { name, .. } => name,
        }
    }

    /// Process exit code for this failure
    ///
    /// Create/update failures share the deploy code: both are remote
    /// mutation failures of the same step family.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReconcileError::Sync { .. } => 1,
            ReconcileError::Create { .. } | ReconcileError::Deploy { .. } => 2,
            ReconcileError::Query { .. } => 3,
        }
    }
}

/// Malformed CLI input, validated before any remote call
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// App name fails platform naming rules
    #[error("app name `{name}` is invalid: {reason}")]
    InvalidName { name: String, reason: String },

    /// Bundle root missing or not a directory
    #[error("source path {0:?} does not exist or is not a directory")]
    SourceNotADirectory(PathBuf),

    /// Destination identifier missing
    #[error("remote path must not be empty")]
    EmptyRemotePath,
}

/// Process exit code for invalid arguments
pub const EXIT_INVALID_ARGS: i32 = 4;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SyncFailure;

    #[test]
    fn test_exit_codes() {
        let name = AppName::new("iot-dash").unwrap();
        let sync = ReconcileError::Sync {
            name: name.clone(),
            source: SyncError::Partial {
                result: SyncResult {
                    files_transferred: 3,
                    bytes_transferred: 1024,
                    errors: vec![SyncFailure {
                        path: "assets/logo.png".to_string(),
                        cause: "permission denied".to_string(),
                    }],
                },
            },
        };
        assert_eq!(sync.exit_code(), 1);

        let deploy = ReconcileError::Deploy {
            name: name.clone(),
            state: AppState::Created,
            source: DeployError::Rejected {
                reason: "quota exceeded".to_string(),
            },
        };
        assert_eq!(deploy.exit_code(), 2);

        let query = ReconcileError::Query {
            name,
            attempts: 3,
            source: QueryError::Malformed("empty response".to_string()),
        };
        assert_eq!(query.exit_code(), 3);
    }

    #[test]
    fn test_deploy_error_reports_remaining_state() {
        let err = ReconcileError::Deploy {
            name: AppName::new("iot-dash").unwrap(),
            state: AppState::Created,
            source: DeployError::Rejected {
                reason: "bundle too large".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("iot-dash"));
        assert!(msg.contains("created"));
        assert!(msg.contains("bundle too large"));
    }
}
