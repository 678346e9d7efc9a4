//! CLI command implementations

mod app;
mod config;
mod deploy;
mod logs;

pub use app::{start_command, status_command, stop_command};
pub use config::{config_get, config_set, config_show};
pub use deploy::deploy_command;
pub use logs::logs_command;
