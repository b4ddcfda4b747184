//! CLI support for rql-lang
//!
//! Provides programmatic access to the `rql` commands for embedding in
//! other tools.

mod check;
mod docs;

pub use check::{CheckOptions, CheckResult, OutputMode, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Pass a query argument or pipe one to stdin.")]
    NoInput,

    #[error("Unknown category: '{0}'\nRun 'rql docs' to see available categories.")]
    UnknownCategory(String),
}
