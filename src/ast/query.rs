use std::fmt;

use crate::{
    ast::Term,
    serializer::string::{StringifyOptions, to_rql_string},
};

/// Complete parsed query.
///
/// The selector holds the whole expression tree; `fields`, `sort`, `limit`
/// and `skip` are extracted from the `select`/`exclude`, `sort` and `limit`
/// terms. Each of those reflects only the last occurrence of its term.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Root expression, always a logical group
    pub selector: Term,

    /// Projection: field path to include (`true`) or exclude (`false`),
    /// in source order
    pub fields: Vec<(String, bool)>,

    /// Sort: field path to `1` (ascending) or `-1` (descending),
    /// in source order
    pub sort: Vec<(String, i32)>,

    /// Number of documents to skip
    pub skip: u64,

    /// Maximum number of documents, `-1` when unset
    pub limit: i64,
}

impl Default for Query {
    fn default() -> Self {
        Query {
            selector: Term::and(),
            fields: Vec::new(),
            sort: Vec::new(),
            skip: 0,
            limit: -1,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.skip == 0
            && self.limit == -1
            && self.fields.is_empty()
            && self.sort.is_empty()
            && self.selector.args.is_empty()
    }

    pub fn field(&self, path: &str) -> Option<bool> {
        lookup(&self.fields, path).copied()
    }

    pub fn sort_order(&self, path: &str) -> Option<i32> {
        lookup(&self.sort, path).copied()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_rql_string(self, &StringifyOptions::default()))
    }
}

fn lookup<'a, T>(entries: &'a [(String, T)], key: &str) -> Option<&'a T> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Sets `key` in an ordered entry list, keeping the position of an existing key.
pub(crate) fn upsert<T>(entries: &mut Vec<(String, T)>, key: String, value: T) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}
