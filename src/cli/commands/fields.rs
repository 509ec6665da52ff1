//! `ctk fields` command - List the contact field catalog

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FieldDefinition, CONTACT_FIELDS};

#[derive(clap::Args, Debug)]
pub struct FieldsArgs {
    /// Only show fields every row must have
    #[arg(long)]
    pub required: bool,
}

pub fn run(args: FieldsArgs, global: &GlobalOpts) -> Result<()> {
    let fields: Vec<&FieldDefinition> = CONTACT_FIELDS
        .iter()
        .filter(|f| !args.required || f.required)
        .collect();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&fields).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for f in &fields {
                println!("{}\t{}\t{}\t{}", f.key, f.label, f.field_type, f.required);
            }
        }
        OutputFormat::Auto => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Label", "Type", "Required"]);
            for f in &fields {
                builder.push_record([
                    f.key,
                    f.label,
                    f.field_type.as_str(),
                    if f.required { "yes" } else { "" },
                ]);
            }
            println!("{}", builder.build().with(Style::sharp()));

            if !global.quiet {
                println!();
                println!("{} field(s)", style(fields.len()).cyan());
            }
        }
    }

    Ok(())
}
