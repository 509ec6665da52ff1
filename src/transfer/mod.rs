//! Contact bulk transfer pipeline: parse, map, validate, import, export

pub mod export;
pub mod import;
pub mod mapping;
pub mod parser;
pub mod session;
pub mod template;
pub mod validate;

pub use export::{export_contacts, ExportError, ExportFile};
pub use import::{import_rows, CancelToken, ImportOptions, ImportOutcome, ImportProgress, RowResult};
pub use mapping::{auto_map, FieldMapping, MappingError, MappingIssue};
pub use parser::{parse, parse_file, ParseError, ParsedCsv, ParsedRow};
pub use session::{ImportSession, ImportStep, SessionError};
pub use template::{template_csv, TEMPLATE_FILENAME};
pub use validate::{validate, RowReport, ValidationResult};

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }
}
