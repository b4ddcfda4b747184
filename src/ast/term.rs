use std::fmt;

use crate::{
    serializer::string::{StringifyOptions, term_to_rql_string},
    value::Value,
};

/// Name of the `and` conjunction term.
pub const AND: &str = "and";

/// Name of the `or` conjunction term.
pub const OR: &str = "or";

/// A node of the expression tree.
///
/// The parser produces three shapes: named terms (`eq(a,1)`, `a&b`),
/// unnamed parenthesized lists (`(1,2,3)`) and coerced scalar values.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Operator application or logical group
    Term(Term),

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// in(a,(1,2,3))
    /// ```
    Array(Vec<Node>),

    /// Coerced scalar
    Value(Value),
}

impl Node {
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Node::Term(term) => Some(term),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Resolves the node as a field path.
    ///
    /// Scalars name a field directly; arrays of scalars are joined with `.`,
    /// so `(a,b,c)` names `a.b.c`.
    pub fn as_path(&self) -> Option<String> {
        match self {
            Node::Value(value) => value.as_path_segment(),
            Node::Array(items) if !items.is_empty() => items
                .iter()
                .map(|item| item.as_value().and_then(Value::as_path_segment))
                .collect::<Option<Vec<_>>>()
                .map(|segments| segments.join(".")),
            _ => None,
        }
    }

    /// Converts the node to a plain value, if it contains no terms.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Node::Value(value) => Some(value.clone()),
            Node::Array(items) => items
                .iter()
                .map(Node::to_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Node::Term(_) => None,
        }
    }
}

impl From<Term> for Node {
    fn from(term: Term) -> Self {
        Node::Term(term)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Value(Value::from(s))
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Value(Value::Integer(n))
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::Value(Value::Float(n))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Value(Value::Boolean(b))
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A named node with ordered arguments.
///
/// `and` / `or` terms are logical groups whose arguments are sibling
/// expressions; any other name is an operator applied to its arguments.
/// `name` is `None` only while the parser is still building an unnamed
/// parenthesized list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Term {
    pub name: Option<String>,
    pub args: Vec<Node>,
}

impl Term {
    pub fn new(name: impl Into<String>) -> Self {
        Term {
            name: Some(name.into()),
            args: Vec::new(),
        }
    }

    pub fn with_args(name: impl Into<String>, args: Vec<Node>) -> Self {
        Term {
            name: Some(name.into()),
            args,
        }
    }

    /// An empty `and` group, the selector of an empty query.
    pub fn and() -> Self {
        Term::new(AND)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Returns true for `and` / `or` groups.
    pub fn is_conjunction(&self) -> bool {
        self.is_named(AND) || self.is_named(OR)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&term_to_rql_string(self, &StringifyOptions::default()))
    }
}
