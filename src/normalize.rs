//! Rewrite passes applied to query text before it is tokenized.
//!
//! Each pass is enabled by a [`ParserOptions`] flag and they always run in
//! this order:
//!
//! 1. [`decode_query_operators`] - `%3C=` → `=le=`, `%3E` → `=gt=`, ...
//! 2. [`convert_slashed_arrays`] - `a/b/c` → `(a,b,c)`
//! 3. [`convert_fiql`] - `a<=b` → `le(a,b)`, `a=op=b` → `op(a,b)`
//!
//! ```
//! use rql_lang::normalize::convert_fiql;
//!
//! assert_eq!(convert_fiql("a<=1&b=in=(1,2)"), "le(a,1)&in(b,(1,2))");
//! ```

use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use crate::{ast::CmpOp, parser::ParserOptions};

static QUERY_OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%3[CcEe]=?").expect("valid operator pattern"));

static SLASHED_ARRAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+*$\-:A-Za-z0-9_%.]*/[+*$\-:A-Za-z0-9_%./]*").expect("valid slashed array pattern")
});

static FIQL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(\([+*$\-:A-Za-z0-9_%.,]+\)|[+*$\-:A-Za-z0-9_%.]*)",
        r"([<>!]?=(?:[A-Za-z0-9_]*=)?|>|<)",
        r"(\([+*$\-:A-Za-z0-9_%.,]*\)|[+*$\-:A-Za-z0-9_%.]*)",
    ))
    .expect("valid FIQL pattern")
});

/// Applies the enabled passes in order.
pub fn normalize<'a>(input: &'a str, options: &ParserOptions) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(input);

    if options.json_query_compatible {
        text = Cow::Owned(decode_query_operators(&text).into_owned());
    }

    if options.allow_slashed_arrays {
        text = Cow::Owned(convert_slashed_arrays(&text).into_owned());
    }

    if options.fiql_compatible {
        text = Cow::Owned(convert_fiql(&text).into_owned());
    }

    text
}

/// Rewrites percent-encoded `<`, `>`, `<=`, `>=` into FIQL operators.
pub fn decode_query_operators(input: &str) -> Cow<'_, str> {
    QUERY_OPERATOR.replace_all(input, |caps: &Captures| {
        let matched = &caps[0];
        let less = matched[..3].eq_ignore_ascii_case("%3c");
        match (less, matched.ends_with('=')) {
            (true, true) => "=le=",
            (true, false) => "=lt=",
            (false, true) => "=ge=",
            (false, false) => "=gt=",
        }
    })
}

/// Rewrites every run of value characters containing `/` into a list.
pub fn convert_slashed_arrays(input: &str) -> Cow<'_, str> {
    if !input.contains('/') {
        return Cow::Borrowed(input);
    }

    SLASHED_ARRAY.replace_all(input, |caps: &Captures| format!("({})", caps[0].replace('/', ",")))
}

/// Desugars `property OP value` triples into `op(property,value)`.
///
/// The fixed symbols map to `eq`, `ne`, `lt`, `le`, `gt`, `ge`; a custom
/// `=name=` operator becomes `name`.
pub fn convert_fiql(input: &str) -> Cow<'_, str> {
    FIQL.replace_all(input, |caps: &Captures| {
        let operator = &caps[2];
        let name = if operator.len() < 3 {
            CmpOp::from_symbol(operator).map_or(operator, |op| op.name())
        } else {
            &operator[1..operator.len() - 1]
        };

        format!("{}({},{})", name, &caps[1], &caps[3])
    })
}
