//! `ctk import` command - Import contacts from a CSV file

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{api_client, open_session, print_issues, print_validation};
use crate::cli::{CsvInputArgs, GlobalOpts, OutputFormat};
use crate::transfer::{CancelToken, ImportOptions, RowResult, SessionError};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub input: CsvInputArgs,

    /// Validate the file and report what would be imported, without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Contacts to create in parallel (default: config concurrency or 1)
    #[arg(long)]
    pub concurrency: Option<usize>,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let mut session = open_session(&args.input)?;
    let json = global.format == OutputFormat::Json;

    if !json {
        println!(
            "{} Importing contacts from {}{}",
            style("→").blue(),
            style(args.input.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
        println!();
    }

    let importable = match session.confirm_mapping() {
        Ok(result) => {
            if !json {
                print_validation(result);
            }
            result.importable().len()
        }
        Err(SessionError::Mapping(issues)) => {
            if json {
                let out = json!({ "issues": &issues });
                println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
            } else {
                print_issues(&issues);
            }
            return Err(miette::miette!(
                help = "Adjust columns with --map COLUMN=FIELD or --map COLUMN=skip",
                "Mapping has {} issue(s)",
                issues.len()
            ));
        }
        Err(e) => return Err(e).into_diagnostic(),
    };

    if args.dry_run {
        if json {
            let out = json!({ "importable": importable });
            println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
            return Ok(());
        }
        println!();
        println!(
            "{}",
            style(format!(
                "Dry run complete. {} contact(s) would be imported.",
                importable
            ))
            .yellow()
        );
        return Ok(());
    }

    if importable == 0 {
        return Err(SessionError::NothingToImport).into_diagnostic();
    }

    if !args.yes && Term::stdout().is_term() {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Import {} contact(s)?", importable))
            .default(true)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("{}", style("Import cancelled.").yellow());
            return Ok(());
        }
    }

    let api = api_client(&config)?;
    let options = ImportOptions {
        concurrency: args.concurrency.unwrap_or_else(|| config.concurrency()).max(1),
        cancel: CancelToken::new(),
    };

    let show_rows = !json && !global.quiet;
    if show_rows {
        println!();
    }
    let outcome = session
        .run_import(&api, &options, |progress| {
            if !show_rows {
                return;
            }
            let pct = style(format!("[{:>3}%]", progress.percent)).dim();
            match &progress.result {
                RowResult::Created => println!(
                    "{} {} Row {}: Created",
                    pct,
                    style("✓").green(),
                    progress.row
                ),
                RowResult::Failed(error) => println!(
                    "{} {} Row {}: {}",
                    pct,
                    style("✗").red(),
                    progress.row,
                    error
                ),
            }
        })
        .into_diagnostic()?
        .clone();

    let invalid = session
        .validation()
        .map(|v| v.errors.len())
        .unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome).into_diagnostic()?);
    } else {
        // Print summary
        println!();
        println!("{}", style("─".repeat(50)).dim());
        println!("{}", style("Import Summary").bold());
        println!("{}", style("─".repeat(50)).dim());
        println!(
            "  Rows processed:   {}",
            style(outcome.success + outcome.failed).cyan()
        );
        println!("  Contacts created: {}", style(outcome.success).green());
        if outcome.failed > 0 {
            println!("  Failed:           {}", style(outcome.failed).red());
        }
        if invalid > 0 {
            println!("  Invalid (skipped): {}", style(invalid).dim());
        }
        if outcome.cancelled {
            println!("  Not attempted:    {}", style(outcome.skipped).yellow());
        }

        if !outcome.errors.is_empty() {
            println!();
            println!("{}", style("Failed rows:").bold());
            for failure in &outcome.errors {
                println!(
                    "  {} Row {}: {}",
                    style("✗").red(),
                    failure.row,
                    failure.error
                );
            }
        }
    }

    if outcome.failed > 0 {
        return Err(miette::miette!(
            "Import completed with {} failure(s)",
            outcome.failed
        ));
    }

    Ok(())
}
