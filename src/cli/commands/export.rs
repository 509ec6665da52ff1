//! `ctk export` command - Export contacts to a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::helpers::api_client;
use crate::cli::GlobalOpts;
use crate::core::CONTACT_FIELDS;
use crate::transfer::{export_contacts, ExportError};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Only export these contact IDs (comma-separated; default: all contacts)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,

    /// Field keys to export, in column order (comma-separated; default: all fields)
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,

    /// Directory to write the export into (default: config output_dir or .)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Print the CSV instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let fields: Vec<String> = match args.fields {
        Some(list) => list
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect(),
        None => CONTACT_FIELDS.iter().map(|f| f.key.to_string()).collect(),
    };
    // Blocked before any request is made
    if fields.is_empty() {
        return Err(ExportError::NoFields).into_diagnostic();
    }

    let ids: Vec<String> = args
        .ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let config = global.config();
    let api = api_client(&config)?;
    let file = export_contacts(&api, &ids, &fields, CONTACT_FIELDS).into_diagnostic()?;

    if args.stdout {
        println!("{}", file.content);
        return Ok(());
    }

    let dir = args.dir.unwrap_or_else(|| config.output_dir());
    if !dir.exists() {
        fs::create_dir_all(&dir).into_diagnostic()?;
    }
    let path = file.write_to(&dir).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Exported {} contact(s) to {}",
            style("✓").green(),
            style(file.rows).cyan(),
            style(path.display()).yellow()
        );
    }
    Ok(())
}
