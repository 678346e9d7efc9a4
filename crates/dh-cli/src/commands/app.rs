//! Start/stop/status pass-through commands
//!
//! Each maps to a single remote call with no internal state.

use anyhow::Result;

use dh_core::types::{AppName, AppState};
use dh_core::Platform;
use dh_platform::PlatformCli;

use crate::output::{format_app_status, print_error, print_success, print_warning};

/// Start an app's compute
pub async fn start_command(platform: &PlatformCli, name: &AppName) -> Result<()> {
    match platform.start_app(name).await {
        Ok(()) => {
            print_success(&format!("start requested for app `{}`", name));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("failed to start app `{}`: {}", name, e));
            Err(e.into())
        }
    }
}

/// Stop an app's compute
pub async fn stop_command(platform: &PlatformCli, name: &AppName) -> Result<()> {
    match platform.stop_app(name).await {
        Ok(()) => {
            print_success(&format!("stop requested for app `{}`", name));
            Ok(())
        }
        Err(e) => {
            print_error(&format!("failed to stop app `{}`: {}", name, e));
            Err(e.into())
        }
    }
}

/// Show an app's observed state
pub async fn status_command(platform: &PlatformCli, name: &AppName) -> Result<()> {
    let state = match platform.app_status(name).await {
        Ok(s) => s,
        Err(e) => {
            print_error(&format!("failed to query app `{}`: {}", name, e));
            return Err(e.into());
        }
    };

    let line = format_app_status(name, state);
    match state {
        AppState::Running | AppState::Deployed => print_success(&line),
        AppState::Failed => print_error(&line),
        AppState::Absent | AppState::Created => print_warning(&line),
    }

    Ok(())
}
