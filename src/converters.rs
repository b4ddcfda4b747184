//! Value converters: named functions that turn a raw token into a [`Value`].
//!
//! A token of the form `name:rest` is handed to the converter registered
//! under `name`; any other token goes to the parser's default converter
//! (`auto` unless configured otherwise).
//!
//! ```
//! use rql_lang::{ConverterRegistry, Value};
//!
//! let registry = ConverterRegistry::default();
//!
//! assert_eq!(registry.convert("42", "auto").unwrap(), Value::Integer(42));
//! assert_eq!(registry.convert("string:42", "auto").unwrap(), Value::from("42"));
//! assert!(registry.convert("number:abc", "auto").is_err());
//! ```

use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc, sync::LazyLock};

use chrono::DateTime;
use regex::Regex;
use tracing::debug;

use crate::{
    error::{Error, Result},
    temporal,
    value::{Pattern, Value},
};

/// A converter function.
pub type Converter = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid decimal pattern")
});

static HEXADECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?0[xX][0-9a-fA-F]+$").expect("valid hex pattern"));

static REGEX_FLAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[gimsuy]*$").expect("valid flags pattern"));

/// Converter table owned by a parser.
///
/// The default registry holds the built-ins: `auto`, `string`, `number`,
/// `boolean`, `null`, `undefined`, `epoch`, `isodate`, `date`, `re` and
/// `glob`. Hosts add their own with [`ConverterRegistry::register`].
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Converter>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        let mut registry = ConverterRegistry::empty();
        registry.insert("auto", auto);
        registry.insert("string", string);
        registry.insert("number", number);
        registry.insert("boolean", boolean);
        registry.insert("null", |_| Ok(Value::Null));
        registry.insert("undefined", |_| Ok(Value::Undefined));
        registry.insert("epoch", epoch);
        registry.insert("isodate", isodate);
        registry.insert("date", date);
        registry.insert("re", re);
        registry.insert("glob", glob);
        registry
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.names())
            .finish()
    }
}

impl ConverterRegistry {
    /// Registry with the built-in converters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no converters at all.
    pub fn empty() -> Self {
        ConverterRegistry {
            converters: HashMap::new(),
        }
    }

    fn insert<F>(&mut self, name: &str, converter: F)
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.converters.insert(name.to_string(), Arc::new(converter));
    }

    /// Adds or replaces a converter, returning the one it replaced.
    pub fn register<F>(&mut self, name: impl Into<String>, converter: F) -> Option<Converter>
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(converter = %name, "registering value converter");
        self.converters.insert(name, Arc::new(converter))
    }

    pub fn remove(&mut self, name: &str) -> Option<Converter> {
        debug!(converter = %name, "removing value converter");
        self.converters.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Converter> {
        self.converters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    /// Registered converter names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Converts a raw token.
    ///
    /// The text before the first `:` selects the converter; without a colon
    /// the converter named `default_converter` receives the whole token.
    pub fn convert(&self, token: &str, default_converter: &str) -> Result<Value> {
        let (name, body) = token
            .split_once(':')
            .unwrap_or((default_converter, token));

        let converter = self
            .get(name)
            .ok_or_else(|| Error::UnknownConverter(name.to_string()))?;

        converter(body)
    }
}

fn percent_decode(token: &str) -> Cow<'_, str> {
    urlencoding::decode(token).unwrap_or(Cow::Borrowed(token))
}

/// Resolves already-decoded text the way the `auto` converter does.
///
/// One layer of single quotes is stripped, then the text is matched against
/// the reserved literals and numeric syntax; anything else stays a string.
pub(crate) fn auto_value(text: &str) -> Value {
    let text = text
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(text);

    match text {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        "null" => Value::Null,
        "undefined" => Value::Undefined,
        "Infinity" => Value::Float(f64::INFINITY),
        "-Infinity" => Value::Float(f64::NEG_INFINITY),
        _ => parse_number(text).unwrap_or_else(|| Value::String(text.to_string())),
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if HEXADECIMAL.is_match(text) {
        let (negative, digits) = match text.as_bytes()[0] {
            b'-' => (true, &text[3..]),
            b'+' => (false, &text[3..]),
            _ => (false, &text[2..]),
        };
        let magnitude = i64::from_str_radix(digits, 16).ok()?;
        return Some(Value::Integer(if negative { -magnitude } else { magnitude }));
    }

    if !DECIMAL.is_match(text) {
        return None;
    }

    if !text.contains(['.', 'e', 'E'])
        && let Ok(n) = text.parse::<i64>()
    {
        return Some(Value::Integer(n));
    }

    text.parse::<f64>().ok().map(Value::Float)
}

fn auto(token: &str) -> Result<Value> {
    Ok(auto_value(&percent_decode(token)))
}

fn string(token: &str) -> Result<Value> {
    Ok(Value::String(percent_decode(token).into_owned()))
}

fn number(token: &str) -> Result<Value> {
    let text = percent_decode(token);
    match text.as_ref() {
        "Infinity" => Ok(Value::Float(f64::INFINITY)),
        "-Infinity" => Ok(Value::Float(f64::NEG_INFINITY)),
        other => parse_number(other).ok_or_else(|| Error::invalid_value("number", token)),
    }
}

fn boolean(token: &str) -> Result<Value> {
    let text = percent_decode(token);
    Ok(Value::Boolean(text == "true" || text == "1"))
}

fn epoch(token: &str) -> Result<Value> {
    percent_decode(token)
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(Value::Date)
        .ok_or_else(|| Error::invalid_value("epoch", token))
}

fn isodate(token: &str) -> Result<Value> {
    temporal::parse_iso_date(&percent_decode(token))
        .map(Value::Date)
        .ok_or_else(|| Error::invalid_value("isodate", token))
}

fn date(token: &str) -> Result<Value> {
    temporal::parse_date(&percent_decode(token))
        .map(Value::Date)
        .ok_or_else(|| Error::invalid_value("date", token))
}

/// `re:pattern` or `re:/pattern/flags`; malformed delimiters keep the whole
/// text as the pattern.
fn re(token: &str) -> Result<Value> {
    let text = percent_decode(token);

    if let Some(rest) = text.strip_prefix('/')
        && let Some(end) = rest.rfind('/')
        && REGEX_FLAGS.is_match(&rest[end + 1..])
    {
        return Ok(Value::Regex(Pattern::new(&rest[..end], &rest[end + 1..])));
    }

    Ok(Value::Regex(Pattern::new(text, "")))
}

fn glob(token: &str) -> Result<Value> {
    Ok(Value::Regex(glob_to_pattern(&percent_decode(token))))
}

/// Translates a glob into a case-insensitive pattern.
///
/// `*` matches any run and `?` at most one character. The pattern is anchored
/// at each end that does not start or finish with `*`.
pub(crate) fn glob_to_pattern(glob: &str) -> Pattern {
    let anchored_start = !glob.starts_with('*');
    let anchored_end = !glob.ends_with('*');
    let trimmed = glob.trim_matches('*');

    let mut source = String::with_capacity(trimmed.len() + 2);
    if anchored_start {
        source.push('^');
    }
    for ch in trimmed.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push_str(".?"),
            '\\' | '^' | '$' | '.' | '|' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
                source.push('\\');
                source.push(ch);
            }
            _ => source.push(ch),
        }
    }
    if anchored_end {
        source.push('$');
    }

    Pattern::new(source, "i")
}
