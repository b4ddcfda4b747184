//! Backends consuming a parsed [`Query`](crate::Query).
//!
//! - **[string]** - canonical query text, the inverse of the parser
//! - **[mongo]** - structured filter/projection/sort document for a
//!   document store
//!
//! The two are independent; neither calls the other.
pub mod mongo;
pub mod string;

pub use mongo::{CompileOptions, Document, MongoQuery, PropertyFilter, compile, compile_selector};
pub use string::{StringifyOptions, term_to_rql_string, to_rql_string, value_to_rql_string};
