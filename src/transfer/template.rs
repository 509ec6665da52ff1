//! Import template generation

use crate::core::catalog::FieldDefinition;
use crate::transfer::escape_csv;

/// Fixed name of the downloadable template
pub const TEMPLATE_FILENAME: &str = "contacts_import_template.csv";

/// Header row of catalog labels plus one example row
pub fn template_csv(catalog: &[FieldDefinition]) -> String {
    let headers: Vec<String> = catalog.iter().map(|f| escape_csv(f.label)).collect();
    let example: Vec<String> = catalog
        .iter()
        .map(|f| escape_csv(f.example_value()))
        .collect();

    format!("{}\n{}\n", headers.join(","), example.join(","))
}
