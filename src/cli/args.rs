//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, export::ExportArgs, fields::FieldsArgs, import::ImportArgs,
    map::MapArgs, template::TemplateArgs, validate::ValidateArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "ctk")]
#[command(author, version, about = "Contact Transfer Kit")]
#[command(long_about = "Bulk import and export of CRM contacts as CSV files through the contacts API.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Base URL of the contacts API (overrides config and CTK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token for the contacts API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Layered config with command-line flags applied last
    pub fn config(&self) -> Config {
        let mut config = Config::load();
        config.merge(Config {
            api_url: self.api_url.clone(),
            api_token: self.token.clone(),
            timeout_secs: self.timeout,
            ..Default::default()
        });
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the contact fields that can be imported and exported
    Fields(FieldsArgs),

    /// Write a CSV import template
    Template(TemplateArgs),

    /// Show how a CSV file's columns map onto contact fields
    Map(MapArgs),

    /// Validate a CSV file without importing it
    Validate(ValidateArgs),

    /// Import contacts from a CSV file
    Import(ImportArgs),

    /// Export contacts to a CSV file
    Export(ExportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and summaries
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
}

/// Arguments shared by commands that read a CSV file
#[derive(clap::Args, Debug, Clone)]
pub struct CsvInputArgs {
    /// CSV file to read
    pub file: PathBuf,

    /// Override a column mapping: COLUMN=FIELD or COLUMN=skip (repeatable)
    #[arg(long = "map", short = 'm', value_name = "COLUMN=FIELD")]
    pub overrides: Vec<String>,
}
