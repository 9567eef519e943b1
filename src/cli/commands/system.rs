use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::help;
use crate::cli::output::{info, section};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::core::user_data::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("exit", "Save pending changes and exit", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        match context.registry.get(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        }
        return Ok(());
    }
    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    section(format!("Finance Core {}", meta.version));
    info(format!("  Schema ver : v{CURRENT_SCHEMA_VERSION}"));
    info(format!("  Build hash : {} ({})", meta.git_hash, meta.git_status));
    info(format!("  Built at   : {}", meta.timestamp));
    info(format!("  Profile    : {}", meta.profile));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
