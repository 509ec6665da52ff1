//! Core module - field catalog, configuration and the contacts API

pub mod api;
pub mod catalog;
pub mod config;

pub use api::{ApiError, Contact, ContactApi, ContactPayload, ContactQuery, HttpContactApi};
pub use catalog::{find_field, FieldDefinition, FieldType, CONTACT_FIELDS};
pub use config::Config;
