//! Shell state, environment resolution and command dispatch.

use std::{env, path::PathBuf};

use chrono::NaiveDate;
use dialoguer::Confirm;
use strsim::levenshtein;
use thiserror::Error;
use tracing::debug;

use dayroll_config::{Config, ConfigManager};
use dayroll_core::{Clock, FixedClock};
use dayroll_storage_json::{JsonLedgerStore, StoragePaths};

use crate::display::AmountFormat;
use crate::errors::{BudgetError, CliError};
use crate::tracker::DailyTracker;

use super::commands;
use super::output;
use super::registry::CommandRegistry;
use super::system_clock::SystemClock;

pub const SCRIPT_ENV: &str = "DAYROLL_CLI_SCRIPT";
pub const DATA_DIR_ENV: &str = "DAYROLL_DATA_DIR";
pub const TODAY_ENV: &str = "DAYROLL_TODAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("no user selected; use `user <name>` first")]
    NoUser,
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("exit requested")]
    ExitRequested,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) running: bool,
    pub(crate) tracker: DailyTracker,
    pub(crate) config: Config,
    pub(crate) format: AmountFormat,
    config_manager: ConfigManager,
    user: Option<String>,
    registry: CommandRegistry,
}

impl ShellContext {
    /// Builds a context from the environment: data directory, pinned date
    /// and the persisted configuration.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let base = env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_base_dir);
        let config_manager = ConfigManager::with_base_dir(&base)?;
        let config = config_manager.load()?;
        let data_root = config.resolve_data_root(&base);
        let store = JsonLedgerStore::with_retention(
            StoragePaths::under(&data_root),
            config.backup_retention,
        )?;
        let clock = clock_from_env()?;
        debug!(base = %base.display(), data_root = %data_root.display(), "shell storage resolved");

        let tracker = DailyTracker::new(Box::new(store), clock);
        Self::with_parts(mode, tracker, config_manager, config)
    }

    pub fn with_parts(
        mode: CliMode,
        tracker: DailyTracker,
        config_manager: ConfigManager,
        config: Config,
    ) -> Result<Self, CliError> {
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);
        Ok(Self {
            mode,
            running: true,
            tracker,
            format: AmountFormat::from_config(&config),
            user: config.last_user.clone(),
            config,
            config_manager,
            registry,
        })
    }

    pub fn prompt(&self) -> String {
        match &self.user {
            Some(user) => format!("dayroll({user})> "),
            None => "dayroll> ".to_string(),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub(crate) fn require_user(&self) -> Result<String, CommandError> {
        self.user.clone().ok_or(CommandError::NoUser)
    }

    /// Switches the active user and remembers them for the next session.
    pub(crate) fn select_user(&mut self, name: &str) -> Result<(), CommandError> {
        self.user = Some(name.to_string());
        self.config.last_user = Some(name.to_string());
        self.config_manager
            .save(&self.config)
            .map_err(BudgetError::from)?;
        Ok(())
    }

    /// Tokenizes and runs one command line.
    pub fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match shell_words::split(line) {
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
        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    fn dispatch(
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

    fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &input.to_lowercase()), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::info(format!("Suggestion: `{name}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::new()
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    /// Prints a command failure; only terminal-level failures end the shell.
    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::info("Use `help <command>` for usage details.");
            }
            CommandError::NoUser => output::error(err),
            CommandError::Budget(err) => output::error(err),
        }
    }
}

fn clock_from_env() -> Result<Box<dyn Clock>, CliError> {
    match env::var(TODAY_ENV) {
        Ok(raw) => {
            let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|err| {
                CliError::Input(format!("{TODAY_ENV}=`{raw}` is not a YYYY-MM-DD date: {err}"))
            })?;
            Ok(Box::new(FixedClock::new(date)))
        }
        Err(_) => Ok(Box::new(SystemClock)),
    }
}
