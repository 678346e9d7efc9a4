//! deckhand CLI
//!
//! Single binary for deploying app bundles to a workspace platform:
//! - `deploy` reconciles a local bundle with the remote app resource
//! - `start` / `stop` / `status` / `logs` are one-call pass-throughs
//! - `config` manages the local configuration file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckhand::commands;
use deckhand::output::print_error;
use dh_core::config::{self, PlatformConfig};
use dh_core::error::EXIT_INVALID_ARGS;
use dh_core::types::AppName;
use dh_platform::PlatformCli;

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(author, version, about = "Idempotent app deployment for workspace platforms")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync a bundle, create or update the app, and deploy it
    Deploy {
        /// App resource name (unique on the platform)
        #[arg(long)]
        name: String,
        /// Local bundle root to upload
        #[arg(long)]
        source: PathBuf,
        /// Workspace destination path
        #[arg(long)]
        remote: String,
        /// Description attached to the app resource
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Start an app's compute
    Start {
        /// App resource name
        name: String,
    },

    /// Stop an app's compute
    Stop {
        /// App resource name
        name: String,
    },

    /// Show an app's observed state
    Status {
        /// App resource name
        name: String,
    },

    /// Tail app logs
    Logs {
        /// App resource name
        name: String,
        /// Keep following new lines until interrupted
        #[arg(short, long)]
        follow: bool,
        /// Number of trailing lines to fetch
        #[arg(short, long, default_value_t = 100)]
        tail: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get specific config value
    Get { key: String },
    /// Set config value
    Set { key: String, value: String },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too; only real parse errors
            // are invalid arguments
            let is_error = e.use_stderr();
            let _ = e.print();
            if is_error {
                std::process::exit(EXIT_INVALID_ARGS);
            }
            return Ok(());
        }
    };

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Config commands operate on the file directly, before any platform
    // config is resolved
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show => commands::config_show(cli.config.as_ref())?,
            ConfigAction::Get { key } => commands::config_get(cli.config.as_ref(), key)?,
            ConfigAction::Set { key, value } => {
                commands::config_set(cli.config.as_ref(), key, value)?
            }
            ConfigAction::Path => {
                println!("{}", config::default_config_path().display());
            }
        }
        return Ok(());
    }

    // Built once at startup; environment overrides are folded in here and
    // never consulted again
    let platform_config = match PlatformConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            print_error(&format!("Failed to load configuration: {}", e));
            return Err(e.into());
        }
    };

    match cli.command {
        Commands::Deploy {
            name,
            source,
            remote,
            description,
        } => {
            // Ctrl-C cancels between reconcile steps, never mid-call
            let cancel = CancellationToken::new();
            let cancel_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("received Ctrl+C, stopping after the current step...");
                    cancel_signal.cancel();
                }
            });

            let code = commands::deploy_command(
                &platform_config,
                cancel,
                &name,
                source,
                &remote,
                &description,
            )
            .await;
            if code != 0 {
                std::process::exit(code);
            }
        }

        Commands::Start { name } => {
            let name = parse_app_name(&name);
            let platform = PlatformCli::new(&platform_config);
            commands::start_command(&platform, &name).await?;
        }

        Commands::Stop { name } => {
            let name = parse_app_name(&name);
            let platform = PlatformCli::new(&platform_config);
            commands::stop_command(&platform, &name).await?;
        }

        Commands::Status { name } => {
            let name = parse_app_name(&name);
            let platform = PlatformCli::new(&platform_config);
            commands::status_command(&platform, &name).await?;
        }

        Commands::Logs { name, follow, tail } => {
            let name = parse_app_name(&name);
            let platform = PlatformCli::new(&platform_config);
            commands::logs_command(&platform, &name, follow, tail).await?;
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Validate an app name argument, exiting with the invalid-arguments code
/// before any remote call is made
fn parse_app_name(raw: &str) -> AppName {
    match AppName::new(raw) {
        Ok(name) => name,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(EXIT_INVALID_ARGS);
        }
    }
}
