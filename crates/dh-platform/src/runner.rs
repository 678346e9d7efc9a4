//! Platform CLI process invocation

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use dh_core::config::{PlatformConfig, ENV_CONFIG_PROFILE, ENV_HOST};
use dh_core::error::PlatformError;
use dh_core::types::{LogLine, LogStream};

/// Channel capacity for streamed log lines.
///
/// Holds bursts from the child process while the consumer (usually a
/// terminal) catches up.
const LOG_CHANNEL_CAPACITY: usize = 256;

/// Captured result of one CLI invocation
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the CLI exited zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builds and runs invocations of the configured platform CLI
///
/// The credential profile and host override are injected into the child
/// environment on every call; nothing else of the parent environment is
/// touched.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    bin: String,
    env: Vec<(String, String)>,
    timeout: Duration,
}

impl CommandRunner {
    /// Create a runner from platform configuration
    pub fn new(config: &PlatformConfig) -> Self {
        let mut env = Vec::new();
        if let Some(profile) = &config.profile {
            env.push((ENV_CONFIG_PROFILE.to_string(), profile.clone()));
        }
        if let Some(host) = &config.host {
            env.push((ENV_HOST.to_string(), host.clone()));
        }

        Self {
            bin: config.cli_bin.clone(),
            env,
            timeout: config.command_timeout,
        }
    }

    /// Human-readable form of an invocation, used in error messages
    pub fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.bin, args.join(" "))
    }

    /// Run the CLI to completion, capturing output
    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput, PlatformError> {
        let command = self.describe(args);
        tracing::debug!(%command, "running platform CLI");

        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PlatformError::TimedOut {
                command: command.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| PlatformError::Spawn {
                bin: self.bin.clone(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Spawn the CLI and stream its output line by line
    ///
    /// Used for log tailing, where the child may run forever (`--follow`).
    /// The child is killed when the receiver is dropped and the readers
    /// wind down. No timeout applies.
    pub async fn stream(&self, args: &[&str]) -> Result<mpsc::Receiver<LogLine>, PlatformError> {
        let command = self.describe(args);
        tracing::debug!(%command, "streaming from platform CLI");

        let mut cmd = Command::new(&self.bin);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| PlatformError::Spawn {
            bin: self.bin.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::channel(LOG_CHANNEL_CAPACITY);

        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx
                        .send(LogLine {
                            message: line,
                            stream: LogStream::Stdout,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx
                        .send(LogLine {
                            message: line,
                            stream: LogStream::Stderr,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }

        // Reap the child once it exits; kill_on_drop covers early teardown
        tokio::spawn(async move {
            let _ = child.wait().await;
        });

        drop(tx);
        Ok(rx)
    }
}
