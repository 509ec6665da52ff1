//! `ctk map` command - Preview the column mapping for a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{mapping_table, open_session, print_issues};
use crate::cli::{CsvInputArgs, GlobalOpts, OutputFormat};
use crate::core::CONTACT_FIELDS;

#[derive(clap::Args, Debug)]
pub struct MapArgs {
    #[command(flatten)]
    pub input: CsvInputArgs,
}

pub fn run(args: MapArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(&args.input)?;
    let mapping = session
        .mapping()
        .ok_or_else(|| miette::miette!("No mapping available"))?;
    let issues = mapping.check(CONTACT_FIELDS);

    match global.format {
        OutputFormat::Json => {
            let columns: Vec<_> = mapping
                .iter()
                .map(|(column, field)| json!({ "column": column, "field": field }))
                .collect();
            let out = json!({ "columns": columns, "issues": issues });
            println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (column, field) in mapping.iter() {
                println!("{}\t{}", column, field.unwrap_or("skip"));
            }
        }
        OutputFormat::Auto => {
            println!("{}", mapping_table(mapping));
            if issues.is_empty() {
                if !global.quiet {
                    println!();
                    println!("{} Mapping is complete", style("✓").green());
                }
            } else {
                println!();
                print_issues(&issues);
            }
        }
    }

    if !issues.is_empty() {
        return Err(miette::miette!(
            help = "Adjust columns with --map COLUMN=FIELD or --map COLUMN=skip",
            "Mapping has {} issue(s)",
            issues.len()
        ));
    }
    Ok(())
}
