//! Submit validated rows to the contact creation API
//!
//! Rows are processed one at a time by default. With `concurrency > 1` a
//! fixed pool of scoped worker threads pulls rows from a shared queue and
//! reports back over a channel; counters and progress are only ever touched
//! by the calling thread, so progress stays monotonic either way.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, info};

use crate::core::api::{ContactApi, ContactPayload};
use crate::core::catalog::{find_field, FieldDefinition, FieldType};
use crate::transfer::mapping::FieldMapping;
use crate::transfer::parser::ParsedRow;
use crate::transfer::validate::RowReport;

/// Shared flag that stops an import from starting further rows
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Rows in flight at once; 1 means strictly sequential
    pub concurrency: usize,
    pub cancel: CancelToken,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            cancel: CancelToken::new(),
        }
    }
}

/// A row the API rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    pub row: usize,
    pub error: String,
}

/// Final tally of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<ImportFailure>,
    /// 0..=100
    pub progress: u8,
    /// Rows never attempted because the import was cancelled
    pub skipped: usize,
    pub cancelled: bool,
}

/// Result of one row, passed to the progress callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowResult {
    Created,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportProgress {
    pub row: usize,
    pub result: RowResult,
    pub processed: usize,
    pub total: usize,
    pub percent: u8,
}

/// `round(processed / total * 100)`; an empty import is complete
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}

/// Longest leading decimal literal, so `"12abc"` reads as 12
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid number regex")
});

/// Numeric prefix of a cell; `None` when it does not start with a number
pub fn leading_number(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(value.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

/// Convert a trimmed cell to the field's declared type
pub fn coerce(value: &str, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Boolean => {
            let v = value.to_lowercase();
            Value::Bool(matches!(v.as_str(), "true" | "1" | "yes"))
        }
        FieldType::Number => {
            let n = leading_number(value).and_then(Number::from_f64);
            Value::Number(n.unwrap_or_else(|| Number::from(0)))
        }
        FieldType::Text | FieldType::Email | FieldType::Url | FieldType::Date => {
            Value::String(value.to_string())
        }
    }
}

/// Payload for one row: every mapped cell coerced by type, empty ones included
pub fn build_payload(
    data: &ParsedRow,
    mapping: &FieldMapping,
    catalog: &[FieldDefinition],
) -> ContactPayload {
    let mut payload = ContactPayload::new();
    for (header, key) in mapping.mapped() {
        let value = data.value(header);
        let field_type = find_field(catalog, key)
            .map(|f| f.field_type)
            .unwrap_or(FieldType::Text);
        payload.insert(key.to_string(), coerce(value, field_type));
    }
    payload
}

fn submit(
    report: &RowReport,
    mapping: &FieldMapping,
    catalog: &[FieldDefinition],
    api: &dyn ContactApi,
) -> RowResult {
    let payload = build_payload(&report.data, mapping, catalog);
    match api.create_contact(&payload) {
        Ok(_) => RowResult::Created,
        Err(e) => RowResult::Failed(e.to_string()),
    }
}

struct Tally<'f, F> {
    outcome: ImportOutcome,
    processed: usize,
    total: usize,
    on_progress: &'f mut F,
}

impl<F: FnMut(&ImportProgress)> Tally<'_, F> {
    fn record(&mut self, row: usize, result: RowResult) {
        match &result {
            RowResult::Created => self.outcome.success += 1,
            RowResult::Failed(error) => {
                debug!(row, %error, "contact creation failed");
                self.outcome.failed += 1;
                self.outcome.errors.push(ImportFailure {
                    row,
                    error: error.clone(),
                });
            }
        }
        self.processed += 1;
        self.outcome.progress = progress_percent(self.processed, self.total);

        (self.on_progress)(&ImportProgress {
            row,
            result,
            processed: self.processed,
            total: self.total,
            percent: self.outcome.progress,
        });
    }
}

/// Create a contact for every row, continuing past failures
pub fn import_rows<F>(
    rows: &[&RowReport],
    mapping: &FieldMapping,
    catalog: &[FieldDefinition],
    api: &dyn ContactApi,
    options: &ImportOptions,
    mut on_progress: F,
) -> ImportOutcome
where
    F: FnMut(&ImportProgress),
{
    let total = rows.len();
    let workers = options.concurrency.max(1).min(total.max(1));
    info!(total, workers, "starting import");

    let mut tally = Tally {
        outcome: ImportOutcome {
            progress: progress_percent(0, total),
            ..Default::default()
        },
        processed: 0,
        total,
        on_progress: &mut on_progress,
    };

    if workers == 1 {
        for report in rows {
            if options.cancel.is_cancelled() {
                break;
            }
            let result = submit(report, mapping, catalog, api);
            tally.record(report.row, result);
        }
    } else {
        let queue = Mutex::new(rows.iter());
        let (tx, rx) = mpsc::channel::<(usize, RowResult)>();

        thread::scope(|s| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let cancel = &options.cancel;
                s.spawn(move || loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let next = match queue.lock() {
                        Ok(mut rows) => rows.next(),
                        Err(_) => None,
                    };
                    let Some(report) = next else { break };
                    let result = submit(report, mapping, catalog, api);
                    if tx.send((report.row, result)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (row, result) in rx {
                tally.record(row, result);
            }
        });

        tally.outcome.errors.sort_by_key(|f| f.row);
    }

    let mut outcome = tally.outcome;
    outcome.skipped = total - tally.processed;
    outcome.cancelled = outcome.skipped > 0;
    if outcome.cancelled {
        debug!(skipped = outcome.skipped, "import cancelled");
    }
    info!(
        success = outcome.success,
        failed = outcome.failed,
        skipped = outcome.skipped,
        "import finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::{ApiError, Contact, ContactQuery};
    use crate::core::catalog::CONTACT_FIELDS;
    use crate::transfer::mapping::auto_map;
    use crate::transfer::validate::validate;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    /// Records payloads; fails the calls whose 1-based index is listed
    #[derive(Default)]
    struct MockApi {
        fail_calls: Vec<usize>,
        calls: AtomicUsize,
        created: Mutex<Vec<ContactPayload>>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl ContactApi for MockApi {
        fn create_contact(&self, payload: &ContactPayload) -> Result<Contact, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((after, token)) = &self.cancel_after {
                if n >= *after {
                    token.cancel();
                }
            }
            if self.fail_calls.contains(&n) {
                return Err(ApiError::Status {
                    status: 409,
                    message: "Email already exists".into(),
                });
            }
            self.created.lock().unwrap().push(payload.clone());
            Ok(payload.clone())
        }

        fn list_contacts(&self, _query: &ContactQuery) -> Result<Vec<Contact>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn reports(n: usize) -> Vec<RowReport> {
        let headers = vec!["First Name".to_string(), "Last Name".to_string()];
        let mapping = auto_map(&headers, CONTACT_FIELDS);
        let rows: Vec<ParsedRow> = (0..n)
            .map(|i| {
                [("First Name", format!("User{}", i)), ("Last Name", "Test".to_string())]
                    .into_iter()
                    .collect()
            })
            .collect();
        validate(&rows, &mapping, CONTACT_FIELDS).valid
    }

    fn name_mapping() -> FieldMapping {
        auto_map(
            &["First Name".to_string(), "Last Name".to_string()],
            CONTACT_FIELDS,
        )
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("Yes", FieldType::Boolean), json!(true));
        assert_eq!(coerce("1", FieldType::Boolean), json!(true));
        assert_eq!(coerce("no", FieldType::Boolean), json!(false));
        assert_eq!(coerce("12.5", FieldType::Number), json!(12.5));
        assert_eq!(coerce("lots", FieldType::Number), json!(0));
        assert_eq!(coerce("12abc", FieldType::Number), json!(12.0));
        assert_eq!(coerce("-3.5kg", FieldType::Number), json!(-3.5));
        assert_eq!(coerce("1e3", FieldType::Number), json!(1000.0));
        assert_eq!(coerce("", FieldType::Number), json!(0));
        assert_eq!(coerce("", FieldType::Boolean), json!(false));
        assert_eq!(coerce("2024-01-15", FieldType::Date), json!("2024-01-15"));
    }

    #[test]
    fn test_build_payload_coerces_every_mapped_cell() {
        let headers: Vec<String> = ["First Name", "Lead Score", "SMS Opt In", "City", "Junk"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = auto_map(&headers, CONTACT_FIELDS);
        let data: ParsedRow = [
            ("First Name", " Asha "),
            ("Lead Score", "42"),
            ("SMS Opt In", "YES"),
            ("City", ""),
            ("Junk", "x"),
        ]
        .into_iter()
        .collect();

        let payload = build_payload(&data, &mapping, CONTACT_FIELDS);
        assert_eq!(
            Value::Object(payload),
            json!({"firstName": "Asha", "leadScore": 42.0, "smsOptIn": true, "city": ""})
        );
    }

    #[test]
    fn test_build_payload_empty_cells_get_type_defaults() {
        let headers: Vec<String> = ["First Name", "Email Opt In", "Lead Score", "City"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mapping = auto_map(&headers, CONTACT_FIELDS);
        let data: ParsedRow = [
            ("First Name", "Ann"),
            ("Email Opt In", ""),
            ("Lead Score", "  "),
            ("City", ""),
        ]
        .into_iter()
        .collect();

        let payload = build_payload(&data, &mapping, CONTACT_FIELDS);
        assert_eq!(
            Value::Object(payload),
            json!({"firstName": "Ann", "emailOptIn": false, "leadScore": 0, "city": ""})
        );
    }

    #[test]
    fn test_failure_does_not_abort() {
        let rows = reports(3);
        let refs: Vec<&RowReport> = rows.iter().collect();
        let api = MockApi {
            fail_calls: vec![2],
            ..Default::default()
        };

        let outcome = import_rows(
            &refs,
            &name_mapping(),
            CONTACT_FIELDS,
            &api,
            &ImportOptions::default(),
            |_| {},
        );

        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(
            outcome.errors,
            vec![ImportFailure {
                row: 3,
                error: "Email already exists".into()
            }]
        );
        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.progress, 100);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn test_progress_is_monotonic_and_rounded() {
        let rows = reports(7);
        let refs: Vec<&RowReport> = rows.iter().collect();
        let api = MockApi {
            fail_calls: vec![1, 4, 7],
            ..Default::default()
        };

        let mut seen = Vec::new();
        import_rows(
            &refs,
            &name_mapping(),
            CONTACT_FIELDS,
            &api,
            &ImportOptions::default(),
            |p| seen.push((p.processed, p.percent)),
        );

        assert_eq!(seen.len(), 7);
        for (i, (processed, percent)) in seen.iter().enumerate() {
            assert_eq!(*processed, i + 1);
            assert_eq!(*percent, ((i + 1) as f64 / 7.0 * 100.0).round() as u8);
        }
        assert!(seen.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(seen.last().unwrap().1, 100);
    }

    #[test]
    fn test_empty_import_is_complete() {
        let api = MockApi::default();
        let outcome = import_rows(
            &[],
            &name_mapping(),
            CONTACT_FIELDS,
            &api,
            &ImportOptions::default(),
            |_| {},
        );
        assert_eq!(outcome.progress, 100);
        assert_eq!(outcome.success + outcome.failed, 0);
    }

    #[test]
    fn test_cancel_stops_remaining_rows() {
        let rows = reports(5);
        let refs: Vec<&RowReport> = rows.iter().collect();
        let options = ImportOptions::default();
        let api = MockApi {
            cancel_after: Some((2, options.cancel.clone())),
            ..Default::default()
        };

        let outcome = import_rows(&refs, &name_mapping(), CONTACT_FIELDS, &api, &options, |_| {});

        assert_eq!(outcome.success, 2);
        assert_eq!(outcome.skipped, 3);
        assert!(outcome.cancelled);
        assert_eq!(outcome.progress, 40);
    }

    #[test]
    fn test_concurrent_import_attributes_failures() {
        let rows = reports(20);
        let refs: Vec<&RowReport> = rows.iter().collect();
        // Fail by payload rather than call order, which is nondeterministic here
        struct FailOdd;
        impl ContactApi for FailOdd {
            fn create_contact(&self, payload: &ContactPayload) -> Result<Contact, ApiError> {
                let name = payload["firstName"].as_str().unwrap_or_default();
                let n: usize = name.trim_start_matches("User").parse().unwrap();
                if n % 2 == 1 {
                    Err(ApiError::Request(format!("rejected {}", name)))
                } else {
                    Ok(payload.clone())
                }
            }
            fn list_contacts(&self, _query: &ContactQuery) -> Result<Vec<Contact>, ApiError> {
                Ok(Vec::new())
            }
        }

        let options = ImportOptions {
            concurrency: 4,
            ..Default::default()
        };
        let mut percents = Vec::new();
        let outcome = import_rows(&refs, &name_mapping(), CONTACT_FIELDS, &FailOdd, &options, |p| {
            percents.push(p.percent)
        });

        assert_eq!(outcome.success, 10);
        assert_eq!(outcome.failed, 10);
        let failed_rows: Vec<usize> = outcome.errors.iter().map(|f| f.row).collect();
        // UserN sits on CSV line N + 2
        assert_eq!(failed_rows, (1..20).step_by(2).map(|n| n + 2).collect::<Vec<_>>());
        assert_eq!(outcome.errors[0].error, "Request failed: rejected User1");
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(outcome.progress, 100);
    }
}
