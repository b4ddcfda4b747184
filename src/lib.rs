//! Resource Query Language: URL-safe query text with FIQL shorthand,
//! parsed into a term tree and rendered back to canonical text or compiled
//! into a document-store query.
//!
//! ```
//! use rql_lang::{compile, parse_query, to_rql_string, CompileOptions, StringifyOptions};
//!
//! let query = parse_query("select(name)&age>=18&sort(-age)").unwrap();
//!
//! let text = to_rql_string(&query, &StringifyOptions::default());
//! assert_eq!(text, "select(name)&sort(-age)&age>=18");
//!
//! let compiled = compile(&query, &CompileOptions::default());
//! assert_eq!(compiled.selector.len(), 1);
//! ```
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod converters;
pub mod error;
pub mod lexer;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod serializer;
pub mod special_terms;
mod temporal;
pub mod value;

pub use ast::{CmpOp, Node, Query, Term, Token};
pub use converters::{Converter, ConverterRegistry};
pub use error::{Error, Result};
pub use lexer::{Lexer, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{Parser, ParserOptions, SpecialTerm, parse, parse_query};
pub use serializer::{
    CompileOptions, Document, MongoQuery, StringifyOptions, compile, to_rql_string,
};
pub use value::{Pattern, RqlRenderable, Value};
