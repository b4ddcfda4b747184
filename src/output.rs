//! JSON views of values, trees and compiled queries.
//!
//! Everything is built as [`serde_json::Value`] so callers can embed it or
//! print it with [`to_json`] / [`to_json_pretty`]. Values JSON has no type
//! for use MongoDB Extended JSON shapes:
//!
//! | value | JSON |
//! |---|---|
//! | `undefined` | `{"$undefined": true}` |
//! | `Infinity` | `{"$numberDouble": "Infinity"}` |
//! | date | `{"$date": <millis>}` |
//! | pattern | `{"$regularExpression": {"pattern": .., "options": ..}}` |
//!
//! # Examples
//!
//! ```
//! use rql_lang::output::{term_to_json, to_json};
//! use rql_lang::parse;
//!
//! let tree = parse("a=1").unwrap();
//! assert_eq!(
//!     to_json(&term_to_json(&tree)),
//!     r#"{"name":"and","args":[{"name":"eq","args":["a",1]}]}"#
//! );
//! ```

use serde_json::{Map, Number, Value as Json, json};

use crate::{
    ast::{Node, Query, Term},
    serializer::mongo::{Document, MongoQuery},
    value::Value,
};

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Undefined => json!({ "$undefined": true }),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(n) => Json::from(*n),
        Value::Float(n) => match Number::from_f64(*n) {
            Some(number) => Json::Number(number),
            None if n.is_nan() => json!({ "$numberDouble": "NaN" }),
            None if *n > 0.0 => json!({ "$numberDouble": "Infinity" }),
            None => json!({ "$numberDouble": "-Infinity" }),
        },
        Value::String(s) => Json::String(s.clone()),
        Value::Date(date) => json!({ "$date": date.timestamp_millis() }),
        Value::Regex(pattern) => json!({
            "$regularExpression": {
                "pattern": pattern.source,
                "options": pattern.flags,
            }
        }),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Object(pairs) => document_to_json(pairs),
        Value::Custom(custom) => Json::String(custom.to_string()),
    }
}

pub fn node_to_json(node: &Node) -> Json {
    match node {
        Node::Term(term) => term_to_json(term),
        Node::Array(items) => Json::Array(items.iter().map(node_to_json).collect()),
        Node::Value(value) => value_to_json(value),
    }
}

/// `{"name": .., "args": [..]}`
pub fn term_to_json(term: &Term) -> Json {
    json!({
        "name": term.name,
        "args": term.args.iter().map(node_to_json).collect::<Vec<_>>(),
    })
}

pub fn query_to_json(query: &Query) -> Json {
    json!({
        "selector": term_to_json(&query.selector),
        "fields": flags_to_json(&query.fields),
        "sort": flags_to_json(&query.sort),
        "limit": query.limit,
        "skip": query.skip,
    })
}

pub fn document_to_json(document: &Document) -> Json {
    Json::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), value_to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

pub fn mongo_query_to_json(query: &MongoQuery) -> Json {
    json!({
        "selector": document_to_json(&query.selector),
        "fields": flags_to_json(&query.fields),
        "sort": flags_to_json(&query.sort),
        "limit": query.limit,
        "skip": query.skip,
    })
}

fn flags_to_json<T: Into<Json> + Copy>(entries: &[(String, T)]) -> Json {
    Json::Object(
        entries
            .iter()
            .map(|(key, value)| (key.clone(), (*value).into()))
            .collect(),
    )
}

/// Compact JSON text.
pub fn to_json(json: &Json) -> String {
    json.to_string()
}

/// JSON text indented by two spaces.
pub fn to_json_pretty(json: &Json) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
}
