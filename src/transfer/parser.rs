//! CSV text to header list and row maps

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Not a CSV file: {0} (expected a .csv extension)")]
    NotCsv(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: u64, message: String },
}

/// One data row, keyed by raw header text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRow {
    cells: HashMap<String, String>,
}

impl ParsedRow {
    pub fn new(cells: HashMap<String, String>) -> Self {
        Self { cells }
    }

    /// Cell under `header`, if the header exists
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    /// Trimmed cell under `header`, empty when absent
    pub fn value(&self, header: &str) -> &str {
        self.get(header).map(str::trim).unwrap_or("")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParsedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parsed file contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

impl ParsedCsv {
    /// No header or no data rows: nothing to import
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse CSV text. Blank lines are skipped, the first remaining line is the
/// header row. Input with no data rows yields an empty result.
pub fn parse(text: &str) -> Result<ParsedCsv, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ParseError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        if is_blank(&record) {
            continue;
        }
        records.push(record);
    }

    if records.len() < 2 {
        return Ok(ParsedCsv::default());
    }

    let headers: Vec<String> = records[0].iter().map(str::to_string).collect();
    let rows: Vec<ParsedRow> = records[1..]
        .iter()
        .map(|record| -> ParsedRow {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
                .collect()
        })
        .collect();

    Ok(ParsedCsv { headers, rows })
}

/// Read and parse a `.csv` file. Other extensions are rejected unread.
pub fn parse_file(path: &Path) -> Result<ParsedCsv, ParseError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(ParseError::NotCsv(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

/// A whitespace-only line parses as a single empty cell
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_basic() {
        let csv = parse("First Name,Last Name\nJohn,Doe\nJane,Roe\n").unwrap();
        assert_eq!(csv.headers, vec!["First Name", "Last Name"]);
        assert_eq!(csv.rows.len(), 2);
        assert_eq!(csv.rows[1].get("First Name"), Some("Jane"));
    }

    #[test]
    fn test_quoted_comma_stays_in_one_cell() {
        let csv = parse("First Name,Last Name,City\nJohn,\"Doe, Jr.\",Pune\n").unwrap();
        assert_eq!(csv.rows[0].get("Last Name"), Some("Doe, Jr."));
        assert_eq!(csv.rows[0].get("City"), Some("Pune"));
    }

    #[test]
    fn test_escaped_quote() {
        let csv = parse("Notes,City\n\"She said \"\"hi\"\"\",Delhi\n").unwrap();
        assert_eq!(csv.rows[0].get("Notes"), Some("She said \"hi\""));
    }

    #[test]
    fn test_blank_lines_and_whitespace() {
        let csv = parse("\n  Name , Email \n\n  Ann ,  a@b.co \n   \n").unwrap();
        assert_eq!(csv.headers, vec!["Name", "Email"]);
        assert_eq!(csv.rows.len(), 1);
        assert_eq!(csv.rows[0].get("Name"), Some("Ann"));
        assert_eq!(csv.rows[0].get("Email"), Some("a@b.co"));
    }

    #[test]
    fn test_short_row_padded() {
        let csv = parse("a,b,c\n1\n").unwrap();
        assert_eq!(csv.rows[0].get("b"), Some(""));
        assert_eq!(csv.rows[0].get("c"), Some(""));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert!(parse("First Name,Last Name\n").unwrap().is_empty());
        assert!(parse("").unwrap().is_empty());
        assert_eq!(parse("\n\n").unwrap(), ParsedCsv::default());
    }

    #[test]
    fn test_bom_stripped() {
        let csv = parse("\u{feff}Email\nx@y.io\n").unwrap();
        assert_eq!(csv.headers, vec!["Email"]);
    }

    #[test]
    fn test_parse_file_rejects_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.xlsx");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        assert!(matches!(parse_file(&path), Err(ParseError::NotCsv(_))));

        let upper = tmp.path().join("contacts.CSV");
        std::fs::write(&upper, "a,b\n1,2\n").unwrap();
        assert_eq!(parse_file(&upper).unwrap().rows.len(), 1);
    }
}
