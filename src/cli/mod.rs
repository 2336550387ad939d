pub mod commands;
pub mod context;
pub mod output;
pub mod registry;
mod shell;
pub mod system_clock;

pub use context::{CliMode, CommandError, LoopControl, ShellContext};
pub use shell::run_cli;
