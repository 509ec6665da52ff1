//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;

pub use args::{Cli, Commands, CsvInputArgs, GlobalOpts, OutputFormat};
