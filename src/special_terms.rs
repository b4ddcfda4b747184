//! Handlers for terms whose arguments configure the [`Query`] rather than
//! filter it.
//!
//! - `select(a,b)` / `exclude(a,b)` - projection
//! - `sort(a,-b,+c)` - ordering, `-` for descending
//! - `limit(n[,skip])` - paging
//!
//! Each handler replaces what an earlier occurrence of its term set.

use tracing::debug;

use crate::{
    ast::{Node, Query, query::upsert},
    value::Value,
};

/// Names recognized by [`apply`].
pub const NAMES: [&str; 4] = ["select", "exclude", "sort", "limit"];

pub fn is_special_term(name: &str) -> bool {
    NAMES.contains(&name)
}

/// Applies a special term to the query. Returns false for unknown names.
pub fn apply(query: &mut Query, name: &str, args: &[Node]) -> bool {
    match name {
        "select" => select(query, true, args),
        "exclude" => select(query, false, args),
        "sort" => sort(query, args),
        "limit" => limit(query, args),
        _ => return false,
    }
    true
}

fn select(query: &mut Query, include: bool, args: &[Node]) {
    // A lone `exclude(_id)` refines an earlier `select` instead of replacing it.
    let only_id = args.len() == 1 && args[0].as_value().and_then(Value::as_str) == Some("_id");
    if include || !only_id {
        query.fields.clear();
    }

    for arg in args {
        match arg.as_path() {
            Some(path) => upsert(&mut query.fields, path, include),
            None => debug!(?arg, "ignoring projection argument that is not a field path"),
        }
    }
}

fn sort(query: &mut Query, args: &[Node]) {
    query.sort.clear();

    for arg in args {
        let Some(path) = arg.as_path() else {
            debug!(?arg, "ignoring sort argument that is not a field path");
            continue;
        };

        let (field, order) = if let Some(field) = path.strip_prefix('-') {
            (field.to_string(), -1)
        } else if let Some(field) = path.strip_prefix('+') {
            (field.to_string(), 1)
        } else {
            (path, 1)
        };
        upsert(&mut query.sort, field, order);
    }
}

fn limit(query: &mut Query, args: &[Node]) {
    query.limit = args
        .first()
        .and_then(leading_integer)
        .filter(|n| *n >= 1)
        .unwrap_or(-1);

    query.skip = args
        .get(1)
        .and_then(leading_integer)
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0);
}

/// Integer prefix of a value: numbers truncate, strings like `"10px"` give 10.
fn leading_integer(node: &Node) -> Option<i64> {
    let value = node.as_value()?;
    if let Some(n) = value.as_int() {
        return Some(n);
    }

    let text = value.as_str()?.trim_start();
    let digits_from = usize::from(text.starts_with(['-', '+']));
    let end = text[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |i| i + digits_from);

    text[..end].parse().ok()
}
