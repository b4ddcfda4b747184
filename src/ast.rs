//! # RQL - Abstract Syntax Tree
//!
//! This module defines the tree that query text compiles to, and the query
//! record that carries the extracted projection, sort and paging.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[term]** - [`Term`] and [`Node`], the expression tree
//! - **[operators]** - Comparison operators and their textual/store forms
//! - **[query]** - [`Query`], selector plus fields, sort, limit and skip
//!
//! ## Shapes
//!
//! ```text
//! eq(a,1)        Term { name: "eq", args: ["a", 1] }
//! a=1&b=2        Term { name: "and", args: [eq(a,1), eq(b,2)] }
//! (1,2,3)        Node::Array([1, 2, 3])
//! string:1       Node::Value(String("1"))
//! ```
//!
//! Every parsed selector is rooted in a logical group: plain `a&b` and
//! `a,b` both produce an `and` root, `a|b` an `or` root. A redundant
//! explicit `and(...)` around the whole query is collapsed into the root.
pub mod operators;
pub mod query;
pub mod term;
pub mod tokens;

pub use operators::CmpOp;
pub use query::Query;
pub use term::{AND, Node, OR, Term};
pub use tokens::Token;
