//! Fetch contacts and serialize the selected fields to CSV

use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::api::{ApiError, Contact, ContactApi, ContactQuery};
use crate::core::catalog::{find_field, FieldDefinition};
use crate::transfer::escape_csv;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Select at least one field to export")]
    NoFields,

    #[error("Unknown contact field '{0}'")]
    UnknownField(String),

    #[error("No contacts to export")]
    NoContacts,

    #[error("Failed to fetch contacts: {0}")]
    Api(#[from] ApiError),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered export, not yet on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
    /// Contact rows, excluding the header
    pub rows: usize,
}

impl ExportFile {
    /// Write into `dir` through a temporary file so a failed write leaves
    /// nothing behind
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let target = dir.join(&self.filename);
        let io_err = |source: std::io::Error| ExportError::Io {
            path: target.clone(),
            source,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(self.content.as_bytes()).map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;

        Ok(target)
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("contacts_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Render one attribute as a CSV cell
pub fn render_value(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    escape_csv(&raw)
}

/// Serialize contacts to CSV with the given fields as columns
pub fn contacts_to_csv(contacts: &[Contact], fields: &[&FieldDefinition]) -> String {
    let mut lines = Vec::with_capacity(contacts.len() + 1);
    lines.push(
        fields
            .iter()
            .map(|f| escape_csv(f.label))
            .collect::<Vec<_>>()
            .join(","),
    );
    for contact in contacts {
        lines.push(
            fields
                .iter()
                .map(|f| render_value(contact.get(f.key)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Fetch contacts (all, or only `selected_ids`) and render the CSV
pub fn export_contacts(
    api: &dyn ContactApi,
    selected_ids: &[String],
    fields: &[String],
    catalog: &[FieldDefinition],
) -> Result<ExportFile, ExportError> {
    if fields.is_empty() {
        return Err(ExportError::NoFields);
    }
    let defs = fields
        .iter()
        .map(|key| find_field(catalog, key).ok_or_else(|| ExportError::UnknownField(key.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let query = if selected_ids.is_empty() {
        ContactQuery::all()
    } else {
        ContactQuery::with_ids(selected_ids.to_vec())
    };
    let contacts = api.list_contacts(&query)?;
    if contacts.is_empty() {
        return Err(ExportError::NoContacts);
    }
    info!(contacts = contacts.len(), fields = defs.len(), "exporting contacts");

    Ok(ExportFile {
        filename: export_filename(Local::now().date_naive()),
        content: contacts_to_csv(&contacts, &defs),
        rows: contacts.len(),
    })
}
