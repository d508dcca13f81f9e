//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod config;
mod logging;
mod objects;
mod version;

pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use objects::{
    AutomationArgs, ObjectsArgs, OutputFormat, handle_kinds_command, handle_objects_command,
    table_sort,
};
pub use version::display_version;
