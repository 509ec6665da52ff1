//! CLI command implementations

pub mod completions;
pub mod export;
pub mod fields;
pub mod import;
pub mod map;
pub mod template;
pub mod validate;
