use std::path::PathBuf;

use strsim::levenshtein;

use crate::{
    config::{Config, ConfigManager},
    core::{DataManager, UserData},
    currency::{format_currency_value, CurrencyCode, FormatOptions, LocaleConfig},
    storage::JsonStorage,
    time::{Clock, SystemClock},
    utils::paths::PathResolver,
};

use super::commands;
use super::errors::{CliError, CommandError, LoopControl};
use super::output;
use super::registry::CommandRegistry;
use super::shell::parse_command_line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command handler for one shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: DataManager,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub locale: LocaleConfig,
    pub currency: CurrencyCode,
    clock: Box<dyn Clock>,
    /// Unsaved changes to the open user's data.
    pub dirty: bool,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_base_dir(mode, PathResolver::base_dir(), Box::new(SystemClock))
    }

    pub fn with_base_dir(
        mode: CliMode,
        base: PathBuf,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let storage = JsonStorage::new(Some(base.clone()), None)?;
        let config_manager = ConfigManager::with_base_dir(base)?;
        let config = config_manager.load()?;
        let mut context = Self {
            mode,
            registry: commands::registry(),
            manager: DataManager::new(Box::new(storage)),
            locale: config.locale_config(),
            currency: config.currency_code(),
            config_manager,
            config,
            clock,
            dirty: false,
            last_command: None,
            running: true,
        };
        context.auto_open_last();
        Ok(context)
    }

    fn auto_open_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(user) = self.config.last_user.clone() else {
            return;
        };
        match self.manager.open(&user, self.clock.as_ref()) {
            Ok(_) => output::success(format!("Opened last user `{user}`.")),
            Err(err) => output::warning(format!("Could not reopen `{user}`: {err}")),
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn open_user(&mut self, user: &str) -> Result<&UserData, CommandError> {
        self.dirty = false;
        Ok(self.manager.open(user, self.clock.as_ref())?)
    }

    pub(crate) fn restore_backup(&mut self, backup: &str) -> Result<(), CommandError> {
        self.manager.restore(backup, self.clock.as_ref())?;
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.manager.user() {
            Some(user) if self.dirty => format!("finance [{user}*]> "),
            Some(user) => format!("finance [{user}]> "),
            None => "finance> ".to_string(),
        }
    }

    /// Reloads locale and currency after the configuration changed.
    pub(crate) fn apply_config(&mut self) {
        self.locale = self.config.locale_config();
        self.currency = self.config.currency_code();
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_currency_value(amount, &self.currency, &self.locale, &FormatOptions::default())
    }

    pub(crate) fn data(&self) -> Result<&UserData, CommandError> {
        self.manager
            .user()
            .map(|_| self.manager.data())
            .ok_or(CommandError::NoUser)
    }

    /// Runs `edit` against the open user's data with the session clock and
    /// marks the session dirty.
    pub(crate) fn edit<R>(
        &mut self,
        edit: impl FnOnce(&mut UserData, &dyn Clock) -> R,
    ) -> Result<R, CommandError> {
        if self.manager.user().is_none() {
            return Err(CommandError::NoUser);
        }
        self.dirty = true;
        Ok(edit(self.manager.data_mut(), self.clock.as_ref()))
    }

    /// Writes pending changes, if any.
    pub(crate) fn flush(&mut self) -> Result<bool, CommandError> {
        if !self.dirty || self.manager.user().is_none() {
            return Ok(false);
        }
        self.manager.save()?;
        self.dirty = false;
        Ok(true)
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        let control = self.dispatch(&command, raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoUser => {
                output::error(CommandError::NoUser);
                output::hint("Try `user you@example.com` to get started.");
            }
            other => output::error(other),
        }
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    base: PathBuf,
    clock: Box<dyn Clock>,
    lines: &[&str],
) -> Result<ShellContext, CommandError> {
    let mut context =
        ShellContext::with_base_dir(CliMode::Script, base, clock).map_err(|err| {
            CommandError::InvalidArguments(err.to_string())
        })?;
    for line in lines {
        if context.process_line(line)? == LoopControl::Exit {
            break;
        }
    }
    Ok(context)
}
