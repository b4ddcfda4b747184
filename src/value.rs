use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

/// A typed value produced by a converter while parsing.
///
/// Tokens in query text are untyped; the converter named by a token's
/// `name:` prefix (or the default converter) decides which variant a token
/// becomes. Values are never mutated after coercion.
///
/// # Number Preservation
///
/// Integers and floats are kept apart so that `limit(10)` stays an integer,
/// but equality compares them numerically: `Integer(1) == Float(1.0)`.
///
/// # Examples
///
/// ```
/// use rql_lang::Value;
///
/// assert_eq!(Value::Integer(3), Value::Float(3.0));
/// assert_ne!(Value::Null, Value::Undefined);
/// assert_eq!(Value::from("abc"), Value::String("abc".to_string()));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// `null`
    Null,

    /// `undefined`, distinct from `null`
    Undefined,

    /// `true` / `false`
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Floating-point number, including `Infinity` / `-Infinity`
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Point in time (`epoch:`, `isodate:`, `date:`)
    Date(DateTime<Utc>),

    /// Pattern with flags (`re:`, `glob:`)
    Regex(Pattern),

    /// Array of values, used by compiled query documents
    Array(Vec<Value>),

    /// Ordered key/value document, used by compiled query documents
    Object(Vec<(String, Value)>),

    /// Host-provided value registered through a custom converter
    Custom(Arc<dyn RqlRenderable>),
}

impl Value {
    /// Returns the value as a path segment, if it can name a field.
    pub fn as_path_segment(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) if n.is_finite() => Some(n.to_string()),
            _ => None,
        }
    }

    /// Get as integer, truncating floats
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) if n.is_finite() => Some(n.trunc() as i64),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Returns true for documents whose keys are all `$`-prefixed operators.
    pub fn is_operator_document(&self) -> bool {
        match self {
            Value::Object(pairs) => {
                !pairs.is_empty() && pairs.iter().all(|(key, _)| key.starts_with('$'))
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) | (Undefined, Undefined) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => (*a as f64) == *b,
            (String(a), String(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Regex(a), Regex(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b) || a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Value::Regex(p)
    }
}

/// A regular expression source with its flags, as written in query text.
///
/// The pattern is kept as text: it is rendered back by the string serializer
/// and handed to the document store as-is. [`Pattern::to_regex`] compiles it
/// for hosts that want to match locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
}

impl Pattern {
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Self {
        Pattern {
            source: source.into(),
            flags: flags.into(),
        }
    }

    /// Compiles the pattern, honoring the `i`, `m` and `s` flags.
    ///
    /// Other flags (`g`, `u`, `y`) have no meaning for a single match and are
    /// ignored.
    pub fn to_regex(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.source)
            .case_insensitive(self.flags.contains('i'))
            .multi_line(self.flags.contains('m'))
            .dot_matches_new_line(self.flags.contains('s'))
            .build()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

/// Rendering hook for host-provided values.
///
/// Values returned by custom converters implement this trait. The string
/// serializer calls [`RqlRenderable::to_rql`] with its percent-encoder; when
/// it returns `None` the value's `Display` output is encoded instead.
///
/// ```
/// use rql_lang::RqlRenderable;
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Sku(String);
///
/// impl fmt::Display for Sku {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         f.write_str(&self.0)
///     }
/// }
///
/// impl RqlRenderable for Sku {
///     fn to_rql(&self, encode: &dyn Fn(&str) -> String) -> Option<String> {
///         Some(format!("sku:{}", encode(&self.0)))
///     }
/// }
/// ```
pub trait RqlRenderable: fmt::Debug + fmt::Display + Send + Sync {
    fn to_rql(&self, encode: &dyn Fn(&str) -> String) -> Option<String> {
        let _ = encode;
        None
    }
}
