//! Header to contact field mapping

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::core::catalog::{find_field, required_fields, FieldDefinition};

/// Value accepted in overrides to mean "do not import this column"
pub const SKIP: &str = "skip";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Unknown column '{0}'")]
    UnknownHeader(String),

    #[error("Unknown contact field '{0}'")]
    UnknownField(String),

    #[error("Invalid mapping '{0}'. Expected COLUMN=FIELD or COLUMN=skip")]
    Syntax(String),
}

/// Problem with a mapping as a whole, found before any row is validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum MappingIssue {
    UnmappedRequired { key: String, label: String },
    DuplicateTarget { key: String, headers: Vec<String> },
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingIssue::UnmappedRequired { label, .. } => {
                write!(f, "Required field '{}' is not mapped to any column", label)
            }
            MappingIssue::DuplicateTarget { key, headers } => {
                write!(f, "Field '{}' is mapped from several columns: {}", key, headers.join(", "))
            }
        }
    }
}

/// Column to field assignments, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    entries: Vec<(String, Option<String>)>,
}

/// Lowercase and drop everything but ASCII letters and digits
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Guess a field for every header. First catalog match wins.
pub fn auto_map(headers: &[String], catalog: &[FieldDefinition]) -> FieldMapping {
    let entries = headers
        .iter()
        .map(|header| {
            let wanted = normalize(header);
            let key = catalog
                .iter()
                .find(|f| normalize(f.label) == wanted || f.key.to_lowercase() == wanted)
                .map(|f| f.key.to_string());
            (header.clone(), key)
        })
        .collect();

    FieldMapping { entries }
}

impl FieldMapping {
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(h, k)| (h.as_str(), k.as_deref()))
    }

    /// Only the columns that will be imported
    pub fn mapped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(h, k)| k.as_deref().map(|k| (h.as_str(), k)))
    }

    /// Field assigned to `header`, `None` when skipped or unknown
    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h == header)
            .and_then(|(_, k)| k.as_deref())
    }

    /// First column mapped to `key`
    pub fn header_for(&self, key: &str) -> Option<&str> {
        self.mapped().find(|(_, k)| *k == key).map(|(h, _)| h)
    }

    /// Reassign a column; `None` skips it
    pub fn set(
        &mut self,
        header: &str,
        key: Option<&str>,
        catalog: &[FieldDefinition],
    ) -> Result<(), MappingError> {
        if let Some(key) = key {
            if find_field(catalog, key).is_none() {
                return Err(MappingError::UnknownField(key.to_string()));
            }
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|(h, _)| h == header)
            .ok_or_else(|| MappingError::UnknownHeader(header.to_string()))?;
        entry.1 = key.map(str::to_string);
        Ok(())
    }

    /// Apply a `COLUMN=FIELD` or `COLUMN=skip` override
    pub fn apply_override(
        &mut self,
        assignment: &str,
        catalog: &[FieldDefinition],
    ) -> Result<(), MappingError> {
        let (header, key) = assignment
            .rsplit_once('=')
            .map(|(h, k)| (h.trim(), k.trim()))
            .filter(|(h, k)| !h.is_empty() && !k.is_empty())
            .ok_or_else(|| MappingError::Syntax(assignment.to_string()))?;

        let key = if key.eq_ignore_ascii_case(SKIP) {
            None
        } else {
            Some(key)
        };
        self.set(header, key, catalog)
    }

    /// Whole-mapping problems: required fields without a column and fields
    /// fed by more than one column
    pub fn check(&self, catalog: &[FieldDefinition]) -> Vec<MappingIssue> {
        let mut issues = Vec::new();

        for field in required_fields(catalog) {
            if self.header_for(field.key).is_none() {
                issues.push(MappingIssue::UnmappedRequired {
                    key: field.key.to_string(),
                    label: field.label.to_string(),
                });
            }
        }

        for field in catalog {
            let headers: Vec<String> = self
                .mapped()
                .filter(|(_, k)| *k == field.key)
                .map(|(h, _)| h.to_string())
                .collect();
            if headers.len() > 1 {
                issues.push(MappingIssue::DuplicateTarget {
                    key: field.key.to_string(),
                    headers,
                });
            }
        }

        issues
    }
}
