//! Compiles a query into a document-store filter.
//!
//! Comparison terms become `{path: value}` or `{path: {$op: value}}`, `and`
//! groups merge their members into one document, and `or` / `nor` become
//! `$or` / `$nor` lists. Unlike the parser this layer never fails: an
//! operator applied to the wrong number or kind of arguments, or to a field
//! the policy rejects, is left out of the result.
//!
//! ```
//! use rql_lang::{compile, parse_query, CompileOptions, Value};
//!
//! let query = parse_query("a=1&b>2&limit(10)").unwrap();
//! let compiled = compile(&query, &CompileOptions::default());
//!
//! assert_eq!(compiled.selector[0], ("a".to_string(), Value::Integer(1)));
//! assert_eq!(compiled.limit, 10);
//! ```

use std::{collections::HashSet, fmt, sync::Arc};

use tracing::debug;

use crate::{
    ast::{AND, CmpOp, Node, OR, Query, Term},
    value::Value,
};

/// Ordered key/value document.
pub type Document = Vec<(String, Value)>;

/// Predicate deciding whether a field path may appear in the selector.
pub type PropertyFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub struct CompileOptions {
    /// Honor `where(js)` as `$where`
    pub allow_where: bool,

    /// Merge nested `and` groups into one document instead of emitting `$and`
    pub compact_and: bool,

    /// Only these paths are allowed
    pub whitelist: Option<HashSet<String>>,

    /// These paths are rejected
    pub blacklist: Option<HashSet<String>>,

    /// Custom path check; takes precedence over both lists
    pub is_property_allowed: Option<PropertyFilter>,
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("allow_where", &self.allow_where)
            .field("compact_and", &self.compact_and)
            .field("whitelist", &self.whitelist)
            .field("blacklist", &self.blacklist)
            .field("is_property_allowed", &self.is_property_allowed.is_some())
            .finish()
    }
}

impl CompileOptions {
    pub fn with_whitelist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_blacklist<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_property_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_property_allowed = Some(Arc::new(filter));
        self
    }

    /// Checks a path against the predicate, else the whitelist, else the
    /// blacklist. With none configured every path is allowed.
    pub fn is_allowed(&self, path: &str) -> bool {
        if let Some(filter) = &self.is_property_allowed {
            filter(path)
        } else if let Some(whitelist) = &self.whitelist {
            whitelist.contains(path)
        } else if let Some(blacklist) = &self.blacklist {
            !blacklist.contains(path)
        } else {
            true
        }
    }
}

/// Compiled query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MongoQuery {
    pub selector: Document,
    pub fields: Vec<(String, bool)>,
    pub sort: Vec<(String, i32)>,
    /// `0` when the query sets no limit
    pub limit: u64,
    pub skip: u64,
}

pub fn compile(query: &Query, options: &CompileOptions) -> MongoQuery {
    MongoQuery {
        selector: compile_selector(&query.selector, options),
        fields: query.fields.clone(),
        sort: query.sort.clone(),
        limit: u64::try_from(query.limit).unwrap_or(0),
        skip: query.skip,
    }
}

/// Compiles a selector tree. A root `and` is always merged.
pub fn compile_selector(selector: &Term, options: &CompileOptions) -> Document {
    let compiler = Compiler {
        options,
        apply_policy: true,
    };

    if selector.is_named(AND) {
        compiler.and(&selector.args, true).unwrap_or_default()
    } else {
        compiler.term(selector).unwrap_or_default()
    }
}

struct Compiler<'a> {
    options: &'a CompileOptions,
    /// False inside `$elemMatch`, where paths are relative to the element
    apply_policy: bool,
}

fn drop_term(name: &str, reason: &str) -> Option<Document> {
    debug!(operator = name, reason, "dropping term from compiled selector");
    None
}

fn object(key: &str, value: Value) -> Value {
    Value::Object(vec![(key.to_string(), value)])
}

impl Compiler<'_> {
    fn path(&self, name: &str, node: &Node) -> Option<String> {
        let Some(path) = node.as_path() else {
            debug!(operator = name, "dropping term without a field path");
            return None;
        };

        if self.apply_policy && !self.options.is_allowed(&path) {
            debug!(operator = name, path = %path, "field rejected by policy");
            return None;
        }

        Some(path)
    }

    fn term(&self, term: &Term) -> Option<Document> {
        let name = term.name.as_deref()?;
        let args = term.args.as_slice();

        if let Some(op) = CmpOp::from_name(name) {
            return self.comparison(op, args);
        }

        match name {
            AND => self.and(args, self.options.compact_and),
            OR => self.list("$or", args),
            "nor" => self.list("$nor", args),
            "not" => self.not(args),
            "exists" => self.exists(args),
            "type" => self.unary_number(name, "$type", args),
            "size" => self.unary_number(name, "$size", args),
            "mod" => self.modulo(args),
            "regex" => self.regex(args),
            "elemMatch" => self.elem_match(args),
            "where" => self.where_clause(args),
            _ => drop_term(name, "unsupported operator"),
        }
    }

    fn children(&self, args: &[Node]) -> Vec<Document> {
        args.iter()
            .filter_map(Node::as_term)
            .filter_map(|term| self.term(term))
            .filter(|doc| !doc.is_empty())
            .collect()
    }

    fn and(&self, args: &[Node], compact: bool) -> Option<Document> {
        let mut docs = self.children(args);
        match docs.len() {
            0 => None,
            _ if compact => Some(merge(docs)),
            1 => docs.pop(),
            _ => Some(vec![("$and".to_string(), documents(docs))]),
        }
    }

    fn list(&self, key: &str, args: &[Node]) -> Option<Document> {
        let docs = self.children(args);
        if docs.is_empty() {
            return None;
        }
        Some(vec![(key.to_string(), documents(docs))])
    }

    fn comparison(&self, op: CmpOp, args: &[Node]) -> Option<Document> {
        let [field, operand, ..] = args else {
            return drop_term(op.name(), "expected a field and a value");
        };
        let path = self.path(op.name(), field)?;
        let Some(value) = operand.to_value() else {
            return drop_term(op.name(), "operand is not a value");
        };

        if op.takes_array() && !matches!(&value, Value::Array(items) if !items.is_empty()) {
            return drop_term(op.name(), "expected a non-empty list");
        }

        let value = match op.mongo_key() {
            Some(key) => object(key, value),
            None => value,
        };
        Some(vec![(path, value)])
    }

    fn not(&self, args: &[Node]) -> Option<Document> {
        let mut negated = Document::new();

        for term in args.iter().filter_map(Node::as_term) {
            if term.is_conjunction() || term.is_named("nor") || term.is_named("not") {
                debug!(operator = "not", "dropping logical group inside not()");
                continue;
            }

            for (path, value) in self.term(term).unwrap_or_default() {
                if path.starts_with('$') {
                    continue;
                }
                let value = negate(value);
                if !merge_entry(&mut negated, &path, &value) {
                    debug!(operator = "not", path = %path, "dropping conflicting negation");
                }
            }
        }

        (!negated.is_empty()).then_some(negated)
    }

    fn exists(&self, args: &[Node]) -> Option<Document> {
        let (field, flag) = match args {
            [field] => (field, true),
            [field, Node::Value(Value::Boolean(flag))] => (field, *flag),
            _ => return drop_term("exists", "expected a field and an optional boolean"),
        };
        let path = self.path("exists", field)?;
        Some(vec![(path, object("$exists", Value::Boolean(flag)))])
    }

    fn unary_number(&self, name: &str, key: &str, args: &[Node]) -> Option<Document> {
        let [field, Node::Value(value)] = args else {
            return drop_term(name, "expected a field and a number");
        };
        if !value.is_number() {
            return drop_term(name, "expected a number");
        }
        let path = self.path(name, field)?;
        Some(vec![(path, object(key, value.clone()))])
    }

    fn modulo(&self, args: &[Node]) -> Option<Document> {
        let (field, divisor, remainder) = match args {
            [field, divisor, remainder] => (field, divisor, remainder),
            [field, Node::Array(pair)] if pair.len() == 2 => (field, &pair[0], &pair[1]),
            _ => return drop_term("mod", "expected a field, a divisor and a remainder"),
        };

        let numbers: Option<Vec<Value>> = [divisor, remainder]
            .into_iter()
            .map(|node| node.as_value().filter(|v| v.is_number()).cloned())
            .collect();
        let Some(numbers) = numbers else {
            return drop_term("mod", "divisor and remainder must be numbers");
        };

        let path = self.path("mod", field)?;
        Some(vec![(path, object("$mod", Value::Array(numbers)))])
    }

    fn regex(&self, args: &[Node]) -> Option<Document> {
        let (field, pattern, options) = match args {
            [field, pattern] => (field, pattern, None),
            [field, pattern, options] => (field, pattern, Some(options)),
            _ => return drop_term("regex", "expected a field, a pattern and optional flags"),
        };

        let pattern = match pattern.as_value() {
            Some(value @ (Value::String(_) | Value::Regex(_))) => value.clone(),
            _ => return drop_term("regex", "pattern must be a string or a regular expression"),
        };
        let options = match options.map(|node| node.as_value().and_then(Value::as_str)) {
            None => None,
            Some(Some(flags)) => Some(flags.to_string()),
            Some(None) => return drop_term("regex", "flags must be a string"),
        };

        let path = self.path("regex", field)?;
        let mut condition = vec![("$regex".to_string(), pattern)];
        if let Some(flags) = options {
            condition.push(("$options".to_string(), Value::String(flags)));
        }
        Some(vec![(path, Value::Object(condition))])
    }

    fn elem_match(&self, args: &[Node]) -> Option<Document> {
        let [field, conditions @ ..] = args else {
            return drop_term("elemMatch", "expected a field");
        };
        let path = self.path("elemMatch", field)?;

        let element = Compiler {
            options: self.options,
            apply_policy: false,
        };
        let Some(condition) = element.and(conditions, true) else {
            return drop_term("elemMatch", "no usable conditions");
        };

        Some(vec![(path, object("$elemMatch", Value::Object(condition)))])
    }

    fn where_clause(&self, args: &[Node]) -> Option<Document> {
        if !self.options.allow_where {
            return drop_term("where", "$where is disabled");
        }
        match args {
            [Node::Value(Value::String(code))] => {
                Some(vec![("$where".to_string(), Value::String(code.clone()))])
            }
            _ => drop_term("where", "expected a single string"),
        }
    }
}

fn documents(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(Value::Object).collect())
}

/// Merges sibling documents into one. Operator documents on the same path
/// are combined when their operators differ; any other repeated key makes
/// the group fall back to `$and`.
fn merge(docs: Vec<Document>) -> Document {
    if docs.len() == 1 {
        return docs.into_iter().next().unwrap_or_default();
    }

    let mut merged = Document::new();
    let conflict = docs
        .iter()
        .flatten()
        .find(|(key, value)| !merge_entry(&mut merged, key, value));

    match conflict {
        Some((key, _)) => {
            debug!(path = %key, "conflicting conditions, keeping them under $and");
            vec![("$and".to_string(), documents(docs.clone()))]
        }
        None => merged,
    }
}

fn merge_entry(into: &mut Document, key: &str, value: &Value) -> bool {
    let Some(index) = into.iter().position(|(k, _)| k == key) else {
        into.push((key.to_string(), value.clone()));
        return true;
    };
    let existing = &mut into[index].1;

    if !existing.is_operator_document() || !value.is_operator_document() {
        return false;
    }
    let (Value::Object(current), Value::Object(incoming)) = (existing, value) else {
        return false;
    };
    if incoming
        .iter()
        .any(|(op, _)| current.iter().any(|(existing_op, _)| existing_op == op))
    {
        return false;
    }

    current.extend(incoming.iter().cloned());
    true
}

/// Negation of a single path condition.
fn negate(value: Value) -> Value {
    match value {
        Value::Regex(_) => object("$not", value),
        Value::Object(mut pairs) if value_is_operator_document(&pairs) => {
            if pairs.len() == 1 {
                let (op, operand) = pairs.remove(0);
                match op.as_str() {
                    "$ne" => return operand,
                    "$in" => return object("$nin", operand),
                    "$nin" => return object("$in", operand),
                    _ => pairs.push((op, operand)),
                }
            }
            object("$not", Value::Object(pairs))
        }
        other => object("$ne", other),
    }
}

fn value_is_operator_document(pairs: &[(String, Value)]) -> bool {
    !pairs.is_empty() && pairs.iter().all(|(key, _)| key.starts_with('$'))
}
