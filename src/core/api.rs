//! Remote contacts API: the creation and listing collaborators
//!
//! The pipeline only talks to [`ContactApi`]. [`HttpContactApi`] is the
//! production implementation over the dashboard's REST endpoints.

use reqwest::blocking::{Client, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A contact record as returned by the API
pub type Contact = Map<String, Value>;

/// A coerced contact sent to the creation endpoint
pub type ContactPayload = Map<String, Value>;

/// Maximum number of contacts requested in one listing call
pub const EXPORT_LIMIT: usize = 10_000;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the contacts API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Parameters for the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    pub limit: usize,
    /// Restrict to these IDs; empty means all contacts
    pub ids: Vec<String>,
}

impl ContactQuery {
    pub fn all() -> Self {
        Self {
            limit: EXPORT_LIMIT,
            ids: Vec::new(),
        }
    }

    pub fn with_ids(ids: Vec<String>) -> Self {
        Self {
            limit: EXPORT_LIMIT,
            ids,
        }
    }

    /// Query string pairs, `ids` comma-joined when present
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.to_string())];
        if !self.ids.is_empty() {
            params.push(("ids", self.ids.join(",")));
        }
        params
    }
}

/// External collaborator that creates and lists contacts
///
/// Implementations must be `Sync` so the importer can share one instance
/// across its worker threads.
pub trait ContactApi: Sync {
    /// Create one contact, returning the stored record
    fn create_contact(&self, payload: &ContactPayload) -> Result<Contact, ApiError>;

    /// List contacts matching the query
    fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, ApiError>;
}

/// [`ContactApi`] over HTTP
pub struct HttpContactApi {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpContactApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            timeout,
        })
    }

    fn contacts_url(&self) -> String {
        format!("{}/contacts", self.base_url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &text),
        })
    }
}

impl ContactApi for HttpContactApi {
    fn create_contact(&self, payload: &ContactPayload) -> Result<Contact, ApiError> {
        let url = self.contacts_url();
        debug!(%url, fields = payload.len(), "creating contact");

        let response = self.send(self.client.post(&url).json(payload))?;
        let text = response
            .text()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        // Some deployments answer 201 with an empty body
        if text.trim().is_empty() {
            return Ok(payload.clone());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(contact)) => Ok(contact),
            Ok(_) => Ok(payload.clone()),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }

    fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, ApiError> {
        let url = self.contacts_url();
        debug!(%url, limit = query.limit, ids = query.ids.len(), "listing contacts");

        let response = self.send(self.client.get(&url).query(&query.params()))?;
        let body: Value = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        contacts_from_body(body)
    }
}

/// Accepts a bare array or one wrapped under `data` / `contacts`
fn contacts_from_body(body: Value) -> Result<Vec<Contact>, ApiError> {
    let list = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data").or_else(|| obj.remove("contacts")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Decode(
                    "expected an array of contacts".to_string(),
                ))
            }
        },
        _ => {
            return Err(ApiError::Decode(
                "expected an array of contacts".to_string(),
            ))
        }
    };

    Ok(list
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(contact) => Some(contact),
            _ => None,
        })
        .collect())
}

/// Human-readable message from an error response body
fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(msg)) = obj.get(key) {
                if !msg.is_empty() {
                    return msg.clone();
                }
            }
        }
    }
    format!("HTTP {}", status)
}
