//! User selection, persistence, and configuration commands.

use crate::cli::commands::{resolve_index, usage};
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, info, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "user",
            "Open a user's data (saving the current one first)",
            "user [email]",
            cmd_user,
        ),
        CommandEntry::new("save", "Save the open user's data", "save", cmd_save),
        CommandEntry::new(
            "backup",
            "Snapshot the saved data",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List data backups", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Restore a data backup by position or name",
            "restore <backup>",
            cmd_restore,
        ),
        CommandEntry::new(
            "config",
            "Show or change locale and currency",
            "config [show|locale <tag>|currency <code>|backup [note]|backups|restore <backup>]",
            cmd_config,
        ),
    ]
}

fn cmd_user(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(user) = args.first() else {
        match context.manager.user() {
            Some(user) => info(format!("Current user: {user}")),
            None => warning("No user selected."),
        }
        return Ok(());
    };

    if context.flush()? {
        success("Saved changes for the previous user.");
    }
    let data = context.open_user(user)?;
    let scenarios = data.scenarios.len();
    let expenses = data.expenses.expenses.len();

    let opened = context.manager.user().map(str::to_string);
    context.config.last_user = opened.clone();
    context.config_manager.save(&context.config)?;
    success(format!(
        "Opened `{}` ({scenarios} scenario(s), {expenses} expense(s)).",
        opened.unwrap_or_default()
    ));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.data()?;
    context.manager.save()?;
    context.dirty = false;
    success("Data saved.");
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.data()?;
    if context.flush()? {
        info("Pending changes saved before the backup.");
    }
    let note = (!args.is_empty()).then(|| args.join(" "));
    let backup = context.manager.backup(note.as_deref())?;
    success(format!("Backup created: {}", backup.name));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.data()?;
    let backups = context.manager.list_backups()?;
    if backups.is_empty() {
        info("No backups yet.");
        return Ok(());
    }
    section("Backups");
    let rows: Vec<Vec<String>> = backups
        .iter()
        .enumerate()
        .map(|(index, backup)| {
            vec![
                (index + 1).to_string(),
                backup.name.clone(),
                backup
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    output::table(&["#", "Name", "Created"], &rows, &[0]);
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.data()?;
    let selector = args.first().ok_or_else(|| usage("restore <backup>"))?;
    let backups = context.manager.list_backups()?;
    let index = resolve_index(&backups, |b| b.name.as_str(), selector, "backup")?;
    let name = backups[index].name.clone();
    context.restore_backup(&name)?;
    success(format!("Restored `{name}`."));
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (action, rest) = args.split_first().map_or(("show", &[][..]), |(a, r)| (*a, r));
    match action.to_ascii_lowercase().as_str() {
        "show" => {
            section("Configuration");
            info(format!("  Locale    : {}", context.config.locale));
            info(format!("  Currency  : {}", context.config.currency));
            info(format!(
                "  Last user : {}",
                context.config.last_user.as_deref().unwrap_or("-")
            ));
            info(format!("  File      : {}", context.config_manager.path().display()));
            Ok(())
        }
        "locale" => {
            let tag = rest.first().ok_or_else(|| usage("config locale <tag>"))?;
            context.config.locale = tag.to_string();
            save_config(context)?;
            success(format!("Locale set to {tag}."));
            Ok(())
        }
        "currency" => {
            let code = rest.first().ok_or_else(|| usage("config currency <code>"))?;
            context.config.currency = code.to_ascii_uppercase();
            save_config(context)?;
            success(format!("Currency set to {}.", context.config.currency));
            Ok(())
        }
        "backup" => {
            let note = (!rest.is_empty()).then(|| rest.join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            success(format!("Config backup created: {name}"));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                info("No config backups yet.");
            }
            for (index, name) in backups.iter().enumerate() {
                info(format!("  {:>2}. {name}", index + 1));
            }
            Ok(())
        }
        "restore" => {
            let selector = rest.first().ok_or_else(|| usage("config restore <backup>"))?;
            let backups = context.config_manager.list_backups()?;
            let index = resolve_index(&backups, |name| name.as_str(), selector, "config backup")?;
            context.config = context.config_manager.restore(&backups[index])?;
            context.apply_config();
            success(format!("Config restored from `{}`.", backups[index]));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{other}`. Available: show, locale, currency, backup, backups, restore"
        ))),
    }
}

fn save_config(context: &mut ShellContext) -> CommandResult {
    context.config_manager.save(&context.config)?;
    context.apply_config();
    Ok(())
}
