//! CTK: Contact Transfer Kit
//!
//! Bulk import and export of CRM contacts as CSV against the dashboard's
//! contacts API.

pub mod cli;
pub mod core;
pub mod transfer;
