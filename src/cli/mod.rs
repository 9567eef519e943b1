pub mod commands;
pub mod errors;
pub mod help;
pub mod output;
pub mod registry;
mod shell;
pub mod shell_context;

pub use errors::{CliError, CommandError};
pub use shell::{run_cli, SCRIPT_ENV};
pub use shell_context::{CliMode, ShellContext};
