//! Output formatting utilities for the CLI
//!
//! Colored status messages plus table rendering for sync-failure reports.

use tabled::{settings::Style, Table, Tabled};

use dh_core::types::{AppName, AppState, SyncResult};

/// Format the per-file failures of a sync pass as an ASCII table
///
/// Returns an empty string when the sync was clean; callers print nothing
/// in that case.
pub fn format_sync_failures(result: &SyncResult) -> String {
    if result.errors.is_empty() {
        return String::new();
    }

    #[derive(Tabled)]
    struct FailureRow {
        #[tabled(rename = "FILE")]
        path: String,
        #[tabled(rename = "CAUSE")]
        cause: String,
    }

    let rows: Vec<FailureRow> = result
        .errors
        .iter()
        .map(|f| FailureRow {
            path: f.path.clone(),
            cause: f.cause.clone(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format an observed app state as a one-line status report
pub fn format_app_status(name: &AppName, state: AppState) -> String {
    format!("app `{}` is {}", name, state)
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix, to stderr
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix, to stderr
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use dh_core::types::SyncFailure;

    #[test]
    fn test_clean_sync_formats_to_nothing() {
        let result = SyncResult::default();
        assert_eq!(format_sync_failures(&result), "");
    }

    #[test]
    fn test_failures_render_paths_and_causes() {
        let result = SyncResult {
            files_transferred: 3,
            bytes_transferred: 1024,
            errors: vec![SyncFailure {
                path: "assets/logo.png".to_string(),
                cause: "permission denied".to_string(),
            }],
        };
        let table = format_sync_failures(&result);
        assert!(table.contains("assets/logo.png"));
        assert!(table.contains("permission denied"));
    }

    #[test]
    fn test_format_app_status() {
        let name = AppName::new("iot-dash").unwrap();
        assert_eq!(
            format_app_status(&name, AppState::Running),
            "app `iot-dash` is running"
        );
    }
}
