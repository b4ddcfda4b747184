//! Parse a query and render it in the requested form

use super::CliError;
use crate::{
    CompileOptions, Parser, ParserOptions, StringifyOptions, compile,
    output::{mongo_query_to_json, term_to_json},
    to_rql_string,
};

/// What `execute_check` produces on success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Only validate syntax
    #[default]
    Syntax,
    /// Term tree as JSON
    Tree,
    /// Canonical query text
    Text,
    /// Compiled document-store query as JSON
    Mongo,
}

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The query text
    pub query: String,
    pub mode: OutputMode,
    /// Parser settings for tree output; other modes parse with the query preset
    pub parser: ParserOptions,
    pub compile: CompileOptions,
    pub stringify: StringifyOptions,
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// JSON output
    Json(serde_json::Value),
    /// Text output
    Text(String),
}

/// Execute an rql check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let query = options.query.trim();

    match options.mode {
        OutputMode::Tree => {
            let tree = Parser::new(options.parser.clone()).parse(query)?;
            Ok(CheckResult::Json(term_to_json(&tree)))
        }
        OutputMode::Syntax => {
            Parser::for_queries().parse_query(query)?;
            Ok(CheckResult::SyntaxValid)
        }
        OutputMode::Text => {
            let parsed = Parser::for_queries().parse_query(query)?;
            Ok(CheckResult::Text(to_rql_string(&parsed, &options.stringify)))
        }
        OutputMode::Mongo => {
            let parsed = Parser::for_queries().parse_query(query)?;
            let compiled = compile(&parsed, &options.compile);
            Ok(CheckResult::Json(mongo_query_to_json(&compiled)))
        }
    }
}
