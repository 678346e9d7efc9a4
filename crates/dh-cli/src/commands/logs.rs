//! Logs command implementation

use anyhow::Result;

use dh_core::types::{AppName, LogStream};
use dh_core::Platform;
use dh_platform::PlatformCli;

use crate::output::print_error;

/// Tail app logs, optionally following forever
///
/// The stream ends when the platform CLI exits (or on Ctrl-C when
/// following); restarting it means reissuing the command.
pub async fn logs_command(
    platform: &PlatformCli,
    name: &AppName,
    follow: bool,
    tail: u32,
) -> Result<()> {
    let mut rx = match platform.app_logs(name, follow, tail).await {
        Ok(rx) => rx,
        Err(e) => {
            print_error(&format!("failed to fetch logs for app `{}`: {}", name, e));
            return Err(e.into());
        }
    };

    while let Some(line) = rx.recv().await {
        match line.stream {
            LogStream::Stdout => println!("{}", line.message),
            LogStream::Stderr => eprintln!("{}", line.message),
        }
    }

    Ok(())
}
