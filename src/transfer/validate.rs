//! Row validation: required fields and soft format checks

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::core::catalog::{required_fields, FieldDefinition, FieldType};
use crate::transfer::mapping::FieldMapping;
use crate::transfer::parser::ParsedRow;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Minimum digits (plus a leading `+`) for a plausible phone number
const MIN_PHONE_LEN: usize = 10;

pub const INVALID_EMAIL: &str = "Invalid email format";
pub const INVALID_PHONE: &str = "Phone number seems invalid";

/// CSV line number of a zero-based data row (line 1 is the header)
pub fn row_number(index: usize) -> usize {
    index + 2
}

/// Validation verdict for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    pub row: usize,
    #[serde(skip)]
    pub data: ParsedRow,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Disjoint partition of all input rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: Vec<RowReport>,
    pub warnings: Vec<RowReport>,
    pub errors: Vec<RowReport>,
}

impl ValidationResult {
    pub fn total(&self) -> usize {
        self.valid.len() + self.warnings.len() + self.errors.len()
    }

    /// Rows that will be imported (valid and warning rows) in file order
    pub fn importable(&self) -> Vec<&RowReport> {
        let mut rows: Vec<&RowReport> = self.valid.iter().chain(self.warnings.iter()).collect();
        rows.sort_by_key(|r| r.row);
        rows
    }

    pub fn first_errors(&self, n: usize) -> &[RowReport] {
        &self.errors[..self.errors.len().min(n)]
    }
}

/// Check every row against the catalog rules under `mapping`
pub fn validate(
    rows: &[ParsedRow],
    mapping: &FieldMapping,
    catalog: &[FieldDefinition],
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for (index, data) in rows.iter().enumerate() {
        let report = check_row(row_number(index), data, mapping, catalog);
        if !report.errors.is_empty() {
            result.errors.push(report);
        } else if !report.warnings.is_empty() {
            result.warnings.push(report);
        } else {
            result.valid.push(report);
        }
    }

    debug!(
        valid = result.valid.len(),
        warnings = result.warnings.len(),
        errors = result.errors.len(),
        "validated rows"
    );
    result
}

fn check_row(
    row: usize,
    data: &ParsedRow,
    mapping: &FieldMapping,
    catalog: &[FieldDefinition],
) -> RowReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for field in required_fields(catalog) {
        let present = mapping
            .header_for(field.key)
            .is_some_and(|header| !data.value(header).is_empty());
        if !present {
            errors.push(format!("Missing required field: {}", field.label));
        }
    }

    for (header, key) in mapping.mapped() {
        let value = data.value(header);
        if value.is_empty() {
            continue;
        }

        let is_email = catalog
            .iter()
            .any(|f| f.key == key && f.field_type == FieldType::Email);
        if is_email && !EMAIL_RE.is_match(value) {
            warnings.push(INVALID_EMAIL.to_string());
        }

        if key == "phone" && !plausible_phone(value) {
            warnings.push(INVALID_PHONE.to_string());
        }
    }

    RowReport {
        row,
        data: data.clone(),
        errors,
        warnings,
    }
}

fn plausible_phone(value: &str) -> bool {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .count()
        >= MIN_PHONE_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::CONTACT_FIELDS;
    use crate::transfer::mapping::auto_map;

    const HEADERS: [&str; 4] = ["First Name", "Last Name", "Email", "Phone"];

    fn row(values: [&str; 4]) -> ParsedRow {
        HEADERS.iter().copied().zip(values).collect()
    }

    fn mapping() -> FieldMapping {
        let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        auto_map(&headers, CONTACT_FIELDS)
    }

    #[test]
    fn test_missing_last_name_is_error() {
        let rows = vec![row(["John", "", "john@example.com", "+919876543210"])];
        let result = validate(&rows, &mapping(), CONTACT_FIELDS);

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].errors[0].contains("Last Name"));
        assert!(result.valid.is_empty() && result.warnings.is_empty());
    }

    #[test]
    fn test_bad_email_is_warning_with_row_number() {
        let rows = vec![
            row(["Ann", "Lee", "ann@example.com", "9876543210"]),
            row(["Bob", "Ray", "not-an-email", "9876543210"]),
        ];
        let result = validate(&rows, &mapping(), CONTACT_FIELDS);

        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.errors.is_empty());
        // second data row is CSV line 3
        assert_eq!(result.warnings[0].row, 3);
        assert_eq!(result.warnings[0].warnings, vec![INVALID_EMAIL.to_string()]);
    }

    #[test]
    fn test_short_phone_is_warning() {
        let rows = vec![row(["Ann", "Lee", "", "(022) 555-12"])];
        let result = validate(&rows, &mapping(), CONTACT_FIELDS);
        assert_eq!(result.warnings[0].warnings, vec![INVALID_PHONE.to_string()]);

        let rows = vec![row(["Ann", "Lee", "", "+91 (22) 5555-1234"])];
        assert_eq!(validate(&rows, &mapping(), CONTACT_FIELDS).valid.len(), 1);
    }

    #[test]
    fn test_unmapped_required_fails_every_row() {
        let mut m = mapping();
        m.set("Last Name", None, CONTACT_FIELDS).unwrap();
        let rows = vec![
            row(["Ann", "Lee", "", ""]),
            row(["Bob", "Ray", "", ""]),
        ];
        let result = validate(&rows, &m, CONTACT_FIELDS);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[1].row, 3);
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let rows = vec![
            row(["Ann", "Lee", "ann@example.com", "9876543210"]),
            row(["", "Ray", "bad", "1"]),
            row(["Cy", "Doe", "bad", ""]),
            row(["  ", "  ", "", ""]),
            row(["Di", "Fox", "", ""]),
        ];
        let result = validate(&rows, &mapping(), CONTACT_FIELDS);

        assert_eq!(result.total(), rows.len());
        let mut seen: Vec<usize> = result
            .valid
            .iter()
            .chain(&result.warnings)
            .chain(&result.errors)
            .map(|r| r.row)
            .collect();
        seen.sort();
        assert_eq!(seen, vec![2, 3, 4, 5, 6]);

        for r in &result.errors {
            assert!(!r.errors.is_empty());
        }
        for r in result.valid.iter().chain(&result.warnings) {
            assert!(r.errors.is_empty());
        }
        for r in &result.warnings {
            assert!(!r.warnings.is_empty());
        }
    }

    #[test]
    fn test_importable_in_file_order() {
        let rows = vec![
            row(["Ann", "Lee", "bad", ""]),
            row(["Bob", "Ray", "", ""]),
            row(["", "", "", ""]),
            row(["Cy", "Doe", "", ""]),
        ];
        let result = validate(&rows, &mapping(), CONTACT_FIELDS);
        let order: Vec<usize> = result.importable().iter().map(|r| r.row).collect();
        assert_eq!(order, vec![2, 3, 5]);
    }
}
