//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::CsvInputArgs;
use crate::core::{find_field, Config, HttpContactApi, CONTACT_FIELDS};
use crate::transfer::{parse_file, FieldMapping, ImportSession, MappingIssue, ValidationResult};

/// Rows listed individually in validation summaries
pub const MAX_LISTED_ROWS: usize = 10;

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse the input file, auto-map it and apply `--map` overrides
pub fn open_session(input: &CsvInputArgs) -> Result<ImportSession<'static>> {
    if !input.file.exists() {
        return Err(miette::miette!("File not found: {}", input.file.display()));
    }

    let parsed = parse_file(&input.file).into_diagnostic()?;
    let mut session = ImportSession::new(CONTACT_FIELDS);
    session
        .load(parsed)
        .map_err(|e| miette::miette!("{}: {}", input.file.display(), e))?;

    for assignment in &input.overrides {
        session.apply_override(assignment).into_diagnostic()?;
    }

    Ok(session)
}

/// HTTP client for the configured contacts API
pub fn api_client(config: &Config) -> Result<HttpContactApi> {
    let url = config.api_url.as_deref().ok_or_else(|| {
        miette::miette!(
            help = "Pass --api-url, set CTK_API_URL, or add api_url to .ctk/config.yaml",
            "No contacts API configured"
        )
    })?;
    HttpContactApi::new(url, config.api_token.clone(), config.timeout()).into_diagnostic()
}

/// Column → field table
pub fn mapping_table(mapping: &FieldMapping) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Column", "Field", "Label", "Type"]);

    for (header, key) in mapping.iter() {
        match key.and_then(|k| find_field(CONTACT_FIELDS, k)) {
            Some(field) => builder.push_record([
                truncate_str(header, 32),
                field.key.to_string(),
                field.label.to_string(),
                field.field_type.to_string(),
            ]),
            None => builder.push_record([
                truncate_str(header, 32),
                "(skip)".to_string(),
                String::new(),
                String::new(),
            ]),
        }
    }

    builder.build().with(Style::sharp()).to_string()
}

pub fn print_issues(issues: &[MappingIssue]) {
    for issue in issues {
        eprintln!("{} {}", style("✗").red(), issue);
    }
}

/// Counts plus the first few error and warning rows
pub fn print_validation(result: &ValidationResult) {
    println!(
        "  {} valid, {} with warnings, {} with errors",
        style(result.valid.len()).green(),
        style(result.warnings.len()).yellow(),
        style(result.errors.len()).red()
    );

    if !result.errors.is_empty() {
        println!();
        println!("{}", style("Rows that will be skipped:").bold());
        for report in result.first_errors(MAX_LISTED_ROWS) {
            println!(
                "  {} Row {}: {}",
                style("✗").red(),
                report.row,
                report.errors.join("; ")
            );
        }
        if result.errors.len() > MAX_LISTED_ROWS {
            println!(
                "  {}",
                style(format!("... and {} more", result.errors.len() - MAX_LISTED_ROWS)).dim()
            );
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("{}", style("Rows imported with warnings:").bold());
        for report in result.warnings.iter().take(MAX_LISTED_ROWS) {
            println!(
                "  {} Row {}: {}",
                style("!").yellow(),
                report.row,
                report.warnings.join("; ")
            );
        }
        if result.warnings.len() > MAX_LISTED_ROWS {
            println!(
                "  {}",
                style(format!("... and {} more", result.warnings.len() - MAX_LISTED_ROWS)).dim()
            );
        }
    }
}
