//! `ctk template` command - Write the CSV import template

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::CONTACT_FIELDS;
use crate::transfer::{template_csv, TEMPLATE_FILENAME};

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Print the template instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Directory to write the template into (default: config output_dir or .)
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

pub fn run(args: TemplateArgs, global: &GlobalOpts) -> Result<()> {
    let csv = template_csv(CONTACT_FIELDS);

    if args.stdout {
        // Output to stdout (can be redirected to file)
        print!("{}", csv);
        return Ok(());
    }

    let dir = args.dir.unwrap_or_else(|| global.config().output_dir());
    if !dir.exists() {
        fs::create_dir_all(&dir).into_diagnostic()?;
    }
    let path = dir.join(TEMPLATE_FILENAME);
    fs::write(&path, csv).into_diagnostic()?;

    if !global.quiet {
        println!(
            "{} Wrote import template to {}",
            style("✓").green(),
            style(path.display()).yellow()
        );
    }
    Ok(())
}
