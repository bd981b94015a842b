// CLI layer - argument parsing, config, session state, terminal rendering
//
// The chat loop owns a SessionContext per process run; every remote
// concern goes through ExecutionContext's clients, and everything printed
// goes through presentation::formatters so color handling stays in one
// place.

mod args;
mod commands;
pub mod config;
pub mod context;
mod handlers;
pub mod presentation;
pub mod session;

pub use args::{Cli, Commands, ConfigCommand, KbCommand};
pub use commands::run;
