//! Canonical query text.
//!
//! Rendering a parsed query and parsing the result gives back the same tree:
//!
//! ```
//! use rql_lang::{parse_query, to_rql_string, StringifyOptions};
//!
//! let query = parse_query("a==1&sort(+b)&c=lt=5").unwrap();
//! assert_eq!(to_rql_string(&query, &StringifyOptions::default()), "sort(b)&a=1&c<5");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{AND, CmpOp, Node, OR, Query, Term},
    converters::auto_value,
    output::value_to_json,
    special_terms::is_special_term,
    value::Value,
};

static INFIX_LEFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\([+*$\-:A-Za-z0-9_%.,]+\)|[+*$\-:A-Za-z0-9_%.]+)$")
        .expect("valid left operand pattern")
});

static INFIX_RIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\([+*$\-:A-Za-z0-9_%.,]*\)|[+*$\-:A-Za-z0-9_%.]*)$")
        .expect("valid right operand pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StringifyOptions {
    /// Percent-encode strings twice, for transports that decode once
    pub double_encode: bool,
}

/// Renders a whole query: projection, sort and paging clauses first, then
/// the selector.
pub fn to_rql_string(query: &Query, options: &StringifyOptions) -> String {
    RqlPrinter::new(*options).print_query(query)
}

/// Renders a term as the root of a query.
pub fn term_to_rql_string(term: &Term, options: &StringifyOptions) -> String {
    RqlPrinter::new(*options).print_root(term, false, false)
}

/// Renders a single value as a query token.
pub fn value_to_rql_string(value: &Value, options: &StringifyOptions) -> String {
    RqlPrinter::new(*options).print_value(value)
}

struct RqlPrinter {
    options: StringifyOptions,
}

impl RqlPrinter {
    fn new(options: StringifyOptions) -> Self {
        RqlPrinter { options }
    }

    fn print_query(&self, query: &Query) -> String {
        let mut clauses = Vec::new();

        let selected = self.paths(query.fields.iter().filter(|(_, v)| *v).map(|(k, _)| k));
        if !selected.is_empty() {
            clauses.push(format!("select({})", selected.join(",")));
        }

        let excluded = self.paths(query.fields.iter().filter(|(_, v)| !*v).map(|(k, _)| k));
        if !excluded.is_empty() {
            clauses.push(format!("exclude({})", excluded.join(",")));
        }

        if !query.sort.is_empty() {
            let keys: Vec<String> = query
                .sort
                .iter()
                .map(|(path, order)| {
                    let path = self.print_string(path);
                    if *order < 0 { format!("-{path}") } else { path }
                })
                .collect();
            clauses.push(format!("sort({})", keys.join(",")));
        }

        if query.limit != -1 || query.skip != 0 {
            if query.skip == 0 {
                clauses.push(format!("limit({})", query.limit));
            } else {
                clauses.push(format!("limit({},{})", query.limit, query.skip));
            }
        }

        let selector = self.print_root(&query.selector, true, !clauses.is_empty());
        if !selector.is_empty() {
            clauses.push(selector);
        }

        clauses.join("&")
    }

    fn paths<'a>(&self, paths: impl Iterator<Item = &'a String>) -> Vec<String> {
        paths.map(|path| self.print_string(path)).collect()
    }

    /// The root group is written without parentheses. In query mode the
    /// top-level special terms are left out, having been written as clauses.
    ///
    /// A root `and` whose only member is another `and` keeps the prefix form,
    /// since the parser collapses one redundant level. A root `or` with fewer
    /// than two members ends in a dangling `|`.
    fn print_root(&self, term: &Term, query_mode: bool, has_clauses: bool) -> String {
        let separator = if term.is_named(AND) {
            if let [Node::Term(inner)] = term.args.as_slice()
                && inner.is_named(AND)
            {
                return format!("and({})", self.print_term(inner));
            }
            "&"
        } else if term.is_named(OR) {
            "|"
        } else {
            return self.print_term(term);
        };

        let members: Vec<String> = term
            .args
            .iter()
            .filter(|arg| {
                !query_mode
                    || !arg
                        .as_term()
                        .and_then(|t| t.name.as_deref())
                        .is_some_and(is_special_term)
            })
            .map(|arg| self.print_node(arg))
            .collect();

        let mut joined = members.join(separator);
        if separator == "|" && members.len() < 2 {
            joined.push('|');
        }
        if separator == "|" && has_clauses {
            format!("({joined})")
        } else {
            joined
        }
    }

    fn print_term(&self, term: &Term) -> String {
        let Some(name) = term.name.as_deref() else {
            return self.print_list(&term.args);
        };

        if term.is_conjunction() && term.args.len() >= 2 {
            let separator = if name == AND { "&" } else { "|" };
            let members: Vec<String> = term.args.iter().map(|arg| self.print_node(arg)).collect();
            return format!("({})", members.join(separator));
        }

        if let Some(symbol) = CmpOp::from_name(name).and_then(CmpOp::symbol)
            && let [left, right] = term.args.as_slice()
        {
            let left = self.print_node(left);
            let right = self.print_node(right);
            if INFIX_LEFT.is_match(&left) && INFIX_RIGHT.is_match(&right) {
                return format!("{left}{symbol}{right}");
            }
            return format!("{name}({left},{right})");
        }

        format!("{}{}", name, self.print_list(&term.args))
    }

    fn print_list(&self, nodes: &[Node]) -> String {
        let items: Vec<String> = nodes.iter().map(|node| self.print_node(node)).collect();
        format!("({})", items.join(","))
    }

    fn print_node(&self, node: &Node) -> String {
        match node {
            Node::Term(term) => self.print_term(term),
            Node::Array(items) => self.print_list(items),
            Node::Value(value) => self.print_value(value),
        }
    }

    fn print_value(&self, value: &Value) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(n) if n.is_infinite() => {
                let text = if *n > 0.0 { "Infinity" } else { "-Infinity" };
                text.to_string()
            }
            Value::Float(n) => format_float(*n),
            Value::String(s) => self.print_string(s),
            Value::Date(date) => format!("epoch:{}", date.timestamp_millis()),
            Value::Regex(pattern) => {
                if pattern.flags.is_empty() && !pattern.source.starts_with('/') {
                    format!("re:{}", self.encode(&pattern.source))
                } else {
                    format!("re:{}", self.encode(&pattern.to_string()))
                }
            }
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| self.print_value(v)).collect();
                format!("({})", items.join(","))
            }
            Value::Object(_) => self.encode(&value_to_json(value).to_string()),
            Value::Custom(custom) => {
                let encode = |s: &str| self.encode(s);
                custom
                    .to_rql(&encode)
                    .unwrap_or_else(|| self.encode(&custom.to_string()))
            }
        }
    }

    /// Strings the default converter would read back as something else get
    /// an explicit `string:` prefix.
    fn print_string(&self, s: &str) -> String {
        let unchanged = !s.is_empty() && matches!(auto_value(s), Value::String(ref t) if t == s);
        if unchanged {
            self.encode(s)
        } else {
            format!("string:{}", self.encode(s))
        }
    }

    fn encode(&self, s: &str) -> String {
        let once = encode_component(s);
        if self.options.double_encode {
            encode_component(&once)
        } else {
            once
        }
    }
}

/// Exponent form outside `[1e-6, 1e21)`, with an explicit `+` on positive
/// exponents: `1.5e+300`, `1e-7`.
fn format_float(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude < 1e21 && (magnitude >= 1e-6 || magnitude == 0.0) {
        return n.to_string();
    }

    let text = format!("{n:e}");
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => text,
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ .`.
fn encode_component(s: &str) -> String {
    urlencoding::encode(s).replace('~', "%7E")
}
