//! CLI command handlers.

mod config;
mod log;

pub(crate) use config::run_config_show_command;
pub use log::run_log_command;
