//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::ArgumentError;

/// Maximum length of an app name accepted by the platform
pub const APP_NAME_MAX_LEN: usize = 30;

/// Minimum length of an app name accepted by the platform
pub const APP_NAME_MIN_LEN: usize = 2;

/// Unique, immutable identifier for an app resource
///
/// The platform only accepts lowercase alphanumeric names with interior
/// hyphens, 2-30 characters. Validation happens here, before any remote
/// call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppName(String);

impl AppName {
    /// Create a validated app name
    pub fn new(name: impl Into<String>) -> Result<Self, ArgumentError> {
        let name = name.into();

        let len = name.chars().count();
        if !(APP_NAME_MIN_LEN..=APP_NAME_MAX_LEN).contains(&len) {
            return Err(ArgumentError::InvalidName {
                name,
                reason: format!(
                    "must be {}-{} characters",
                    APP_NAME_MIN_LEN, APP_NAME_MAX_LEN
                ),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ArgumentError::InvalidName {
                name,
                reason: "only lowercase letters, digits, and hyphens are allowed".to_string(),
            });
        }

        if name.starts_with('-') || name.ends_with('-') {
            return Err(ArgumentError::InvalidName {
                name,
                reason: "must not start or end with a hyphen".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the raw name string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to reconcile one app, constructed once per invocation
#[derive(Debug, Clone)]
pub struct AppDescriptor {
    /// App resource name (unique on the platform)
    pub name: AppName,
    /// Local bundle root to upload
    pub source_path: PathBuf,
    /// Workspace destination the bundle is synced to and deployed from
    pub remote_path: String,
    /// Human-readable description attached to the resource
    pub description: String,
}

impl AppDescriptor {
    /// Build a descriptor, validating every field before any remote call
    pub fn new(
        name: &str,
        source_path: impl Into<PathBuf>,
        remote_path: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ArgumentError> {
        let name = AppName::new(name)?;

        let source_path = source_path.into();
        if !source_path.is_dir() {
            return Err(ArgumentError::SourceNotADirectory(source_path));
        }

        let remote_path = remote_path.into();
        if remote_path.trim().is_empty() {
            return Err(ArgumentError::EmptyRemotePath);
        }

        Ok(Self {
            name,
            source_path,
            remote_path,
            description: description.into(),
        })
    }
}

/// Observed state of the remote app resource
///
/// Transitions only move forward (Absent -> Created -> Deployed -> Running)
/// except on detected failure, which routes to Failed and allows retry from
/// Created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppState {
    /// No resource with this name exists
    Absent,
    /// Resource exists but has no active deployment
    Created,
    /// A deployment has been accepted; the app may still be starting
    Deployed,
    /// The app is serving
    Running,
    /// The platform reports the app as crashed or errored
    Failed,
}

impl AppState {
    /// Map a platform status string onto the state enum
    ///
    /// The platform reports states like `RUNNING`, `DEPLOYING`, `ERROR`,
    /// `CRASHED`, `UNAVAILABLE`. Unrecognized states map to `Created`:
    /// the resource exists, and the reconciler makes no further assumption.
    pub fn from_platform_state(state: &str) -> Self {
        let s = state.to_ascii_uppercase();
        if s.contains("RUN") {
            AppState::Running
        } else if s.contains("DEPLOY") || s.contains("ACTIVE") {
            AppState::Deployed
        } else if s.contains("ERROR") || s.contains("FAIL") || s.contains("CRASH") {
            AppState::Failed
        } else {
            AppState::Created
        }
    }

    /// Whether this state is a terminal success for a reconcile run
    pub fn is_success(&self) -> bool {
        matches!(self, AppState::Deployed | AppState::Running)
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppState::Absent => write!(f, "absent"),
            AppState::Created => write!(f, "created"),
            AppState::Deployed => write!(f, "deployed"),
            AppState::Running => write!(f, "running"),
            AppState::Failed => write!(f, "failed"),
        }
    }
}

/// A single file that failed to transfer during sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    /// Bundle-relative path of the file
    pub path: String,
    /// Platform-reported cause
    pub cause: String,
}

/// Outcome of one file-sync pass
///
/// Order of `errors` is preserved as reported. Files already copied before
/// a failure are never rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Files actually transferred (unchanged files are skipped by the platform)
    pub files_transferred: u64,
    /// Bytes actually transferred
    pub bytes_transferred: u64,
    /// Per-file failures, in report order
    pub errors: Vec<SyncFailure>,
}

impl SyncResult {
    /// Whether every file transferred cleanly
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Which stream of the app a log line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// One line of app log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// The log message, newline stripped
    pub message: String,
    /// Originating stream
    pub stream: LogStream,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_name_valid() {
        assert!(AppName::new("iot-dash").is_ok());
        assert!(AppName::new("contentpulse").is_ok());
        assert!(AppName::new("a1").is_ok());
    }

    #[test]
    fn test_app_name_invalid() {
        // Too short / too long
        assert!(AppName::new("a").is_err());
        assert!(AppName::new("a".repeat(31)).is_err());
        // Bad characters
        assert!(AppName::new("Iot-Dash").is_err());
        assert!(AppName::new("iot_dash").is_err());
        assert!(AppName::new("iot dash").is_err());
        // Hyphen placement
        assert!(AppName::new("-iot-dash").is_err());
        assert!(AppName::new("iot-dash-").is_err());
    }

    #[test]
    fn test_app_state_from_platform_state() {
        assert_eq!(AppState::from_platform_state("RUNNING"), AppState::Running);
        assert_eq!(
            AppState::from_platform_state("DEPLOYING"),
            AppState::Deployed
        );
        assert_eq!(AppState::from_platform_state("CRASHED"), AppState::Failed);
        assert_eq!(AppState::from_platform_state("ERROR"), AppState::Failed);
        // Unknown states fall back to Created
        assert_eq!(
            AppState::from_platform_state("UNAVAILABLE"),
            AppState::Created
        );
        assert_eq!(AppState::from_platform_state(""), AppState::Created);
    }

    #[test]
    fn test_app_state_display() {
        assert_eq!(format!("{}", AppState::Running), "running");
        assert_eq!(format!("{}", AppState::Deployed), "deployed");
    }

    #[test]
    fn test_descriptor_rejects_missing_source() {
        let err = AppDescriptor::new(
            "iot-dash",
            "/definitely/not/a/real/path",
            "/Workspace/Users/ops/iot-dash",
            "IoT dashboard",
        );
        assert!(matches!(err, Err(ArgumentError::SourceNotADirectory(_))));
    }

    #[test]
    fn test_descriptor_rejects_empty_remote() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppDescriptor::new("iot-dash", dir.path(), "  ", "IoT dashboard");
        assert!(matches!(err, Err(ArgumentError::EmptyRemotePath)));
    }
}
