//! Import session state machine
//!
//! `Upload -> MapFields -> Validate -> Import`, with `back` from MapFields
//! and Validate and `reset` from anywhere. Leaving a step drops the state
//! derived in it.

use std::fmt;
use thiserror::Error;

use crate::core::api::ContactApi;
use crate::core::catalog::FieldDefinition;
use crate::transfer::import::{import_rows, ImportOptions, ImportOutcome, ImportProgress};
use crate::transfer::mapping::{auto_map, FieldMapping, MappingError, MappingIssue};
use crate::transfer::parser::ParsedCsv;
use crate::transfer::validate::{validate, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Upload,
    MapFields,
    Validate,
    Import,
}

impl ImportStep {
    /// 1-based position shown to the user
    pub fn number(&self) -> u8 {
        match self {
            ImportStep::Upload => 1,
            ImportStep::MapFields => 2,
            ImportStep::Validate => 3,
            ImportStep::Import => 4,
        }
    }
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStep::Upload => "upload",
            ImportStep::MapFields => "map fields",
            ImportStep::Validate => "validate",
            ImportStep::Import => "import",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Cannot {action} during the {step} step")]
    InvalidTransition { step: ImportStep, action: &'static str },

    #[error("The file has no data rows")]
    EmptyFile,

    #[error("Mapping is incomplete: {}", format_issues(.0))]
    Mapping(Vec<MappingIssue>),

    #[error(transparent)]
    Override(#[from] MappingError),

    #[error("No valid rows to import")]
    NothingToImport,
}

fn format_issues(issues: &[MappingIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// One import run from file to outcome
pub struct ImportSession<'c> {
    catalog: &'c [FieldDefinition],
    step: ImportStep,
    parsed: Option<ParsedCsv>,
    mapping: Option<FieldMapping>,
    validation: Option<ValidationResult>,
    outcome: Option<ImportOutcome>,
}

impl<'c> ImportSession<'c> {
    pub fn new(catalog: &'c [FieldDefinition]) -> Self {
        Self {
            catalog,
            step: ImportStep::Upload,
            parsed: None,
            mapping: None,
            validation: None,
            outcome: None,
        }
    }

    pub fn step(&self) -> ImportStep {
        self.step
    }

    pub fn parsed(&self) -> Option<&ParsedCsv> {
        self.parsed.as_ref()
    }

    pub fn mapping(&self) -> Option<&FieldMapping> {
        self.mapping.as_ref()
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    pub fn outcome(&self) -> Option<&ImportOutcome> {
        self.outcome.as_ref()
    }

    fn expect_step(&self, step: ImportStep, action: &'static str) -> Result<(), SessionError> {
        if self.step == step {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                step: self.step,
                action,
            })
        }
    }

    /// Upload -> MapFields, auto-mapping the headers
    pub fn load(&mut self, csv: ParsedCsv) -> Result<&FieldMapping, SessionError> {
        self.expect_step(ImportStep::Upload, "load a file")?;
        if csv.is_empty() {
            return Err(SessionError::EmptyFile);
        }

        let mapping = auto_map(&csv.headers, self.catalog);
        self.parsed = Some(csv);
        self.step = ImportStep::MapFields;
        Ok(&*self.mapping.insert(mapping))
    }

    /// Reassign one column while mapping
    pub fn remap(&mut self, header: &str, key: Option<&str>) -> Result<(), SessionError> {
        self.expect_step(ImportStep::MapFields, "change the mapping")?;
        let catalog = self.catalog;
        match self.mapping.as_mut() {
            Some(mapping) => Ok(mapping.set(header, key, catalog)?),
            None => Err(SessionError::InvalidTransition {
                step: self.step,
                action: "change the mapping",
            }),
        }
    }

    /// Apply a `COLUMN=FIELD` override while mapping
    pub fn apply_override(&mut self, assignment: &str) -> Result<(), SessionError> {
        self.expect_step(ImportStep::MapFields, "change the mapping")?;
        let catalog = self.catalog;
        match self.mapping.as_mut() {
            Some(mapping) => Ok(mapping.apply_override(assignment, catalog)?),
            None => Err(SessionError::InvalidTransition {
                step: self.step,
                action: "change the mapping",
            }),
        }
    }

    /// MapFields -> Validate. Refuses mappings with unmapped required
    /// fields or duplicate targets.
    pub fn confirm_mapping(&mut self) -> Result<&ValidationResult, SessionError> {
        self.expect_step(ImportStep::MapFields, "confirm the mapping")?;
        let (Some(parsed), Some(mapping)) = (&self.parsed, &self.mapping) else {
            return Err(SessionError::InvalidTransition {
                step: self.step,
                action: "confirm the mapping",
            });
        };

        let issues = mapping.check(self.catalog);
        if !issues.is_empty() {
            return Err(SessionError::Mapping(issues));
        }

        let result = validate(&parsed.rows, mapping, self.catalog);
        self.step = ImportStep::Validate;
        Ok(&*self.validation.insert(result))
    }

    /// Step back one screen, discarding what that step produced
    pub fn back(&mut self) -> Result<ImportStep, SessionError> {
        match self.step {
            ImportStep::MapFields => {
                self.parsed = None;
                self.mapping = None;
                self.step = ImportStep::Upload;
            }
            ImportStep::Validate => {
                self.validation = None;
                self.step = ImportStep::MapFields;
            }
            step => {
                return Err(SessionError::InvalidTransition {
                    step,
                    action: "go back",
                })
            }
        }
        Ok(self.step)
    }

    /// Validate -> Import. Runs the importer over valid and warning rows.
    pub fn run_import<F>(
        &mut self,
        api: &dyn ContactApi,
        options: &ImportOptions,
        on_progress: F,
    ) -> Result<&ImportOutcome, SessionError>
    where
        F: FnMut(&ImportProgress),
    {
        self.expect_step(ImportStep::Validate, "start the import")?;
        let (Some(mapping), Some(validation)) = (&self.mapping, &self.validation) else {
            return Err(SessionError::InvalidTransition {
                step: self.step,
                action: "start the import",
            });
        };

        let rows = validation.importable();
        if rows.is_empty() {
            return Err(SessionError::NothingToImport);
        }

        self.step = ImportStep::Import;
        let outcome = import_rows(&rows, mapping, self.catalog, api, options, on_progress);
        Ok(&*self.outcome.insert(outcome))
    }

    /// Back to Upload with every derived value cleared
    pub fn reset(&mut self) {
        self.step = ImportStep::Upload;
        self.parsed = None;
        self.mapping = None;
        self.validation = None;
        self.outcome = None;
    }
}
