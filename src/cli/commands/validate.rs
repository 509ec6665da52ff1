//! `ctk validate` command - Check a CSV file without importing it

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, print_issues, print_validation};
use crate::cli::{CsvInputArgs, GlobalOpts, OutputFormat};
use crate::transfer::SessionError;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: CsvInputArgs,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(&args.input)?;

    let result = match session.confirm_mapping() {
        Ok(result) => result,
        Err(SessionError::Mapping(issues)) => {
            print_issues(&issues);
            return Err(miette::miette!(
                help = "Adjust columns with --map COLUMN=FIELD or --map COLUMN=skip",
                "Mapping has {} issue(s)",
                issues.len()
            ));
        }
        Err(e) => return Err(e).into_diagnostic(),
    };

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(result).into_diagnostic()?);
    } else {
        println!(
            "{} Validated {} row(s) from {}",
            style("→").blue(),
            style(result.total()).cyan(),
            style(args.input.file.display()).yellow()
        );
        print_validation(result);
    }

    if !result.errors.is_empty() {
        return Err(miette::miette!(
            "{} row(s) failed validation",
            result.errors.len()
        ));
    }
    Ok(())
}
