// tests/parser_tests.rs

use std::{fmt, sync::Arc};

use chrono::DateTime;
use pretty_assertions::assert_eq;
use rql_lang::{
    Error, Node, Parser, ParserOptions, Pattern, RqlRenderable, Term, Value, parse, parse_query,
};

fn t(name: &str, args: Vec<Node>) -> Node {
    Node::Term(Term::with_args(name, args))
}

fn and(args: Vec<Node>) -> Term {
    Term::with_args("and", args)
}

fn s(value: &str) -> Node {
    Node::from(value)
}

fn date(millis: i64) -> Node {
    Node::Value(Value::Date(DateTime::from_timestamp_millis(millis).unwrap()))
}

fn re(source: &str, flags: &str) -> Node {
    Node::Value(Value::Regex(Pattern::new(source, flags)))
}

/// The configuration the grammar tests run with.
fn parser() -> Parser {
    Parser::new(ParserOptions {
        allow_slashed_arrays: true,
        json_query_compatible: true,
        ..ParserOptions::default()
    })
}

fn p(input: &str) -> Term {
    parser()
        .parse(input)
        .unwrap_or_else(|e| panic!("failed to parse {input}: {e}"))
}

/// Argument list of the single top-level term `a(...)`.
fn a_args(input: &str) -> Vec<Node> {
    match p(input).args.as_slice() {
        [Node::Term(term)] if term.is_named("a") => term.args.clone(),
        other => panic!("expected a(...) for {input}, got {other:?}"),
    }
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_default_options() {
    let options = ParserOptions::default();

    assert!(!options.json_query_compatible);
    assert!(options.fiql_compatible);
    assert!(!options.allow_slashed_arrays);
    assert!(!options.allow_empty_values);
    assert_eq!(options.default_converter, "auto");
    assert!(options.special_terms.is_empty());
    assert_eq!(options.empty_value, Value::from(""));
}

#[test]
fn test_query_options() {
    let options = ParserOptions::for_queries();

    assert!(options.json_query_compatible);
    assert!(options.allow_slashed_arrays);
    assert_eq!(options.special_terms, vec!["select", "exclude", "sort", "limit"]);
}

// ============================================================================
// Lists and terms
// ============================================================================

#[test]
fn test_arrays() {
    assert_eq!(p("a"), and(vec![s("a")]));
    assert_eq!(p("(a)"), and(vec![vec!["a"].into()]));
    assert_eq!(p("a,b,c"), and(vec![s("a"), s("b"), s("c")]));
    assert_eq!(p("(a,b,c)"), and(vec![vec!["a", "b", "c"].into()]));
    assert_eq!(p("()"), and(vec![Node::Array(vec![])]));
}

#[test]
fn test_terms() {
    assert_eq!(p("a(b)"), and(vec![t("a", vec![s("b")])]));
    assert_eq!(p("a(b,c)"), and(vec![t("a", vec![s("b"), s("c")])]));
    assert_eq!(
        p("a((b),c)"),
        and(vec![t("a", vec![vec!["b"].into(), s("c")])])
    );
    assert_eq!(
        p("a((b,c),d)"),
        and(vec![t("a", vec![vec!["b", "c"].into(), s("d")])])
    );
    assert_eq!(p("a(b/c,d)"), p("a((b,c),d)"));
    assert_eq!(
        p("a(b)&c(d(e))"),
        and(vec![
            t("a", vec![s("b")]),
            t("c", vec![t("d", vec![s("e")])]),
        ])
    );
    assert_eq!(p("a()"), and(vec![t("a", vec![])]));
}

#[test]
fn test_dotted_paths() {
    assert_eq!(p("foo.bar=3"), and(vec![t("eq", vec![s("foo.bar"), 3i64.into()])]));
    assert_eq!(p("select(sub.name)"), and(vec![t("select", vec![s("sub.name")])]));
}

// ============================================================================
// FIQL
// ============================================================================

#[test]
fn test_comparison_shorthand() {
    let cases = [
        ("eq", vec!["a=eq=b", "a=b", "a==b"]),
        ("ne", vec!["a=ne=b", "a!=b"]),
        ("lt", vec!["a=lt=b", "a<b", "a%3Cb"]),
        ("le", vec!["a=le=b", "a<=b", "a%3C=b"]),
        ("gt", vec!["a=gt=b", "a>b", "a%3Eb"]),
        ("ge", vec!["a=ge=b", "a>=b", "a%3E=b"]),
    ];

    for (name, inputs) in cases {
        let expected = and(vec![t(name, vec![s("a"), s("b")])]);
        assert_eq!(p(&format!("{name}(a,b)")), expected);
        for input in inputs {
            assert_eq!(p(input), expected, "Failed for input: {}", input);
        }
    }
}

#[test]
fn test_nested_comparisons() {
    let expected = and(vec![t(
        "a",
        vec![t("b", vec![t("le", vec![s("c"), s("d")])])],
    )]);

    assert_eq!(p("a(b(le(c,d)))"), expected);
    assert_eq!(p("a(b(c=le=d))"), expected);
    assert_eq!(p("a(b(c<=d))"), expected);
}

#[test]
fn test_arbitrary_operators() {
    assert_eq!(p("a=b=c"), and(vec![t("b", vec![s("a"), s("c")])]));
    assert_eq!(
        p("a(b=cd=e)"),
        and(vec![t("a", vec![t("cd", vec![s("b"), s("e")])])])
    );
}

#[test]
fn test_fiql_disabled() {
    let parser = Parser::new(ParserOptions {
        fiql_compatible: false,
        ..ParserOptions::default()
    });

    assert!(matches!(
        parser.parse("a=b"),
        Err(Error::InvalidCharacter { character: '=', position: 1 })
    ));
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn test_and_grouping() {
    assert_eq!(p("a&b&c"), and(vec![s("a"), s("b"), s("c")]));
    assert_eq!(p("a(b)&c"), and(vec![t("a", vec![s("b")]), s("c")]));
    assert_eq!(
        p("a&(b&c)"),
        and(vec![s("a"), t("and", vec![s("b"), s("c")])])
    );
}

#[test]
fn test_or_grouping() {
    assert_eq!(
        p("(a|b|c)"),
        and(vec![t("or", vec![s("a"), s("b"), s("c")])])
    );
    assert_eq!(
        p("(a(b)|c)"),
        and(vec![t("or", vec![t("a", vec![s("b")]), s("c")])])
    );
}

#[test]
fn test_complex_grouping() {
    assert_eq!(
        p("a&(b|c)"),
        and(vec![s("a"), t("or", vec![s("b"), s("c")])])
    );
    assert_eq!(
        p("a|(b&c)"),
        Term::with_args("or", vec![s("a"), t("and", vec![s("b"), s("c")])])
    );
    assert_eq!(
        p("(a=b|c=d)&(e=f|g=1)"),
        and(vec![
            t(
                "or",
                vec![
                    t("eq", vec![s("a"), s("b")]),
                    t("eq", vec![s("c"), s("d")]),
                ]
            ),
            t(
                "or",
                vec![
                    t("eq", vec![s("e"), s("f")]),
                    t("eq", vec![s("g"), 1i64.into()]),
                ]
            ),
        ])
    );
}

#[test]
fn test_redundant_and_is_collapsed() {
    assert_eq!(p("and(a,b,c)"), p("a&b&c"));
    assert_eq!(parse("and(a,b,c)").unwrap(), and(vec![s("a"), s("b"), s("c")]));
}

#[test]
fn test_single_or_is_not_collapsed() {
    assert_eq!(p("or(a,b)"), and(vec![t("or", vec![s("a"), s("b")])]));
}

// ============================================================================
// Value coercion
// ============================================================================

#[test]
fn test_auto_converter() {
    assert_eq!(a_args("a(a%20string)"), vec![s("a string")]);
    assert_eq!(a_args("a(123)"), vec![Node::from(123i64)]);
    assert_eq!(a_args("a(123.456)"), vec![Node::from(123.456)]);
    assert_eq!(a_args("a(%27abc%27)"), vec![s("abc")]);
    assert_eq!(a_args("a(true,false)"), vec![Node::from(true), Node::from(false)]);
    assert_eq!(
        a_args("a(null,undefined)"),
        vec![Node::Value(Value::Null), Node::Value(Value::Undefined)]
    );
    assert_eq!(
        a_args("a(Infinity,-Infinity)"),
        vec![Node::from(f64::INFINITY), Node::from(f64::NEG_INFINITY)]
    );
}

#[test]
fn test_string_converter() {
    assert_eq!(a_args("a(string)"), vec![s("string")]);
    assert_eq!(a_args("a(string:b)"), vec![s("b")]);
    assert_eq!(a_args("a(string:1)"), vec![s("1")]);
    assert_eq!(a_args("a(string:null)"), vec![s("null")]);
    assert_eq!(a_args("a(string:)"), vec![s("")]);
}

#[test]
fn test_number_converter() {
    assert_eq!(a_args("a(number)"), vec![s("number")]);
    assert_eq!(a_args("a(number:1)"), vec![Node::from(1i64)]);
    assert_eq!(a_args("a(number:0xFF)"), vec![Node::from(255i64)]);
    assert!(matches!(
        parser().parse("a(number:foo)"),
        Err(Error::InvalidValue { ref converter, .. }) if converter == "number"
    ));
}

#[test]
fn test_boolean_and_null_converters() {
    assert_eq!(a_args("a(boolean:true)"), vec![Node::from(true)]);
    assert_eq!(a_args("a(boolean:1)"), vec![Node::from(true)]);
    assert_eq!(a_args("a(boolean:)"), vec![Node::from(false)]);
    assert_eq!(a_args("a(auto:null)"), vec![Node::Value(Value::Null)]);
    assert_eq!(a_args("a(null:x)"), vec![Node::Value(Value::Null)]);
}

#[test]
fn test_epoch_converter() {
    assert_eq!(a_args("a(epoch)"), vec![s("epoch")]);
    assert_eq!(a_args("a(epoch:0)"), vec![date(0)]);
    assert_eq!(a_args("a(epoch:1355674543236)"), vec![date(1355674543236)]);
    assert!(matches!(
        parser().parse("a(epoch:foo)"),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn test_isodate_converter() {
    assert_eq!(a_args("a(isodate:2012)"), vec![date(1325376000000)]);
    assert_eq!(a_args("a(isodate:2012-05)"), vec![date(1335830400000)]);
    assert_eq!(a_args("a(isodate:2012-08-13T13)"), vec![date(1344862800000)]);
    assert_eq!(a_args("a(isodate:2012-12-18T10:26:59Z)"), vec![date(1355826419000)]);
    assert_eq!(
        p("a(isodate:2012-12-18T10%3A26%3A59Z)"),
        p("a(isodate:2012-12-18T10:26:59Z)")
    );
    assert!(parser().parse("a(isodate:INVALID_ISODATE)").is_err());
}

#[test]
fn test_date_converter() {
    assert_eq!(a_args("a(date)"), vec![s("date")]);
    assert_eq!(a_args("a(date:2012-12-18T10:26:59Z)"), vec![date(1355826419000)]);
    assert_eq!(a_args("a(date:2012-12)"), vec![date(1354320000000)]);
    assert_eq!(a_args("a(date:2012-12-18%2002:50)"), vec![date(1355799000000)]);
    assert!(parser().parse("a(date:INVALID_DATE)").is_err());
}

#[test]
fn test_unknown_converter() {
    assert_eq!(
        parser().parse("a(data:2012-12-18%2010)"),
        Err(Error::UnknownConverter("data".to_string()))
    );
}

#[test]
fn test_re_converter() {
    assert_eq!(a_args("a(re)"), vec![s("re")]);
    assert_eq!(a_args("a(re:simple)"), vec![re("simple", "")]);
    assert_eq!(a_args("a(re:%2Fsimple%2F)"), vec![re("simple", "")]);
    assert_eq!(a_args("a(re:%2Fsimple%2Fim)"), vec![re("simple", "im")]);
    assert_eq!(
        a_args("a(re:%5E%28Foo%28%3F%3ABar%29%29Baz-%5B0-9%5D%7B2%2C%7D%24)"),
        vec![re("^(Foo(?:Bar))Baz-[0-9]{2,}$", "")]
    );
    assert_eq!(
        a_args("a(re:%2F%5E%28Foo%28%3F%3ABar%29%29Baz-%5B0-9%5D%7B2%2C%7D%24%2Fi)"),
        vec![re("^(Foo(?:Bar))Baz-[0-9]{2,}$", "i")]
    );
}

#[test]
fn test_glob_converter() {
    assert_eq!(a_args("a(glob)"), vec![s("glob")]);
    assert_eq!(a_args("a(glob:simple)"), vec![re("^simple$", "i")]);
    assert_eq!(a_args("a(glob:*simple)"), vec![re("simple$", "i")]);
    assert_eq!(a_args("a(glob:simple*)"), vec![re("^simple", "i")]);
    assert_eq!(a_args("a(glob:*simple*)"), vec![re("simple", "i")]);
    assert_eq!(a_args("a(glob:wi*ld%3Fca*rd)"), vec![re("^wi.*ld.?ca.*rd$", "i")]);
    assert_eq!(
        a_args("a(glob:*%28$var%20%5C*%2010%29+%5Bhello%5D)"),
        vec![re(r"\(\$var \\.* 10\)\+\[hello\]$", "i")]
    );
}

#[test]
fn test_default_converter_option() {
    let parser = Parser::new(ParserOptions {
        default_converter: "string".to_string(),
        ..ParserOptions::default()
    });

    assert_eq!(
        parser.parse("a(1,true)").unwrap(),
        and(vec![t("a", vec![s("1"), s("true")])])
    );
}

#[derive(Debug)]
struct Sku(String);

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl RqlRenderable for Sku {}

#[test]
fn test_custom_converter_is_per_parser() {
    let mut custom = Parser::default();
    custom
        .converters_mut()
        .register("sku", |raw| Ok(Value::Custom(Arc::new(Sku(raw.to_uppercase())))));

    let tree = custom.parse("a(sku:ab1)").unwrap();
    let Node::Term(term) = &tree.args[0] else {
        panic!("expected a term");
    };
    match term.args[0].as_value() {
        Some(Value::Custom(sku)) => assert_eq!(sku.to_string(), "AB1"),
        other => panic!("expected a custom value, got {other:?}"),
    }

    assert_eq!(
        Parser::default().parse("a(sku:ab1)"),
        Err(Error::UnknownConverter("sku".to_string()))
    );
}

// ============================================================================
// Empty values
// ============================================================================

#[test]
fn test_empty_value_not_allowed() {
    assert_eq!(
        parser().parse("a=b,,c=d"),
        Err(Error::EmptyValueNotAllowed { position: 8 })
    );
}

#[test]
fn test_empty_value_default_placeholder() {
    let parser = Parser::new(ParserOptions {
        allow_empty_values: true,
        ..ParserOptions::default()
    });

    assert_eq!(parser.parse("a,,b").unwrap(), and(vec![s("a"), s(""), s("b")]));
}

#[test]
fn test_empty_value_custom_placeholder() {
    let parser = Parser::new(ParserOptions {
        allow_empty_values: true,
        empty_value: Value::from("EMPTY_VALUE"),
        ..ParserOptions::default()
    });

    assert_eq!(
        parser.parse("a,,b").unwrap(),
        and(vec![s("a"), s("EMPTY_VALUE"), s("b")])
    );
}

#[test]
fn test_leading_and_trailing_commas_add_nothing() {
    assert_eq!(p("a(,b)"), p("a(b)"));
    assert_eq!(p("a(b,)"), p("a(b)"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_mixed_conjunctions() {
    assert!(matches!(
        parser().parse("a=b|c=d&e=f"),
        Err(Error::MixedConjunction { .. })
    ));
    assert!(matches!(
        parser().parse("a(b&c)"),
        Err(Error::MixedConjunction { position: 3 })
    ));
    assert!(parser().parse("(a=b|c=d)&e=f").is_ok());
}

#[test]
fn test_invalid_character() {
    assert!(matches!(
        parser().parse("a=@"),
        Err(Error::InvalidCharacter { character: '@', .. })
    ));
}

#[test]
fn test_unmatched_parentheses() {
    assert_eq!(
        parser().parse("a(b"),
        Err(Error::UnmatchedParenthesis { position: 1 })
    );
    assert_eq!(
        parser().parse("a)b"),
        Err(Error::UnmatchedParenthesis { position: 1 })
    );
}

// ============================================================================
// Special terms and queries
// ============================================================================

#[test]
fn test_special_terms_last_occurrence_wins() {
    let (tree, specials) = Parser::for_queries()
        .parse_with_special_terms("limit(1)&select(a)&limit(2)&sort(b)")
        .unwrap();

    assert_eq!(tree.args.len(), 4);
    let names: Vec<&str> = specials.iter().map(|st| st.name.as_str()).collect();
    assert_eq!(names, vec!["select", "limit", "sort"]);
    assert_eq!(specials[1].args, vec![Node::from(2i64)]);
}

#[test]
fn test_special_terms_ignored_without_names() {
    let (_, specials) = parser().parse_with_special_terms("select(a)").unwrap();
    assert!(specials.is_empty());
}

#[test]
fn test_parse_query_ignores_special_terms_without_handler() {
    let mut options = ParserOptions::for_queries();
    options.special_terms.push("top".to_string());
    let parser = Parser::new(options);

    let (_, specials) = parser.parse_with_special_terms("top(3)&a=1").unwrap();
    assert_eq!(specials[0].name, "top");

    let query = parser.parse_query("top(3)&limit(2)&a=1").unwrap();
    assert_eq!(query.limit, 2);
    assert!(query.fields.is_empty());
    assert!(query.sort.is_empty());
    assert_eq!(query.selector.args.len(), 3);
}

#[test]
fn test_parse_query_select_last_wins() {
    let query = parse_query("select(a)&select(b)").unwrap();
    assert_eq!(query.fields, vec![("b".to_string(), true)]);
}

#[test]
fn test_parse_query_fields() {
    let query = parse_query("select(a,(b,c))&exclude(d)").unwrap();
    assert_eq!(query.fields, vec![("d".to_string(), false)]);

    let query = parse_query("select(a,b/c)&exclude(_id)").unwrap();
    assert_eq!(
        query.fields,
        vec![
            ("a".to_string(), true),
            ("b.c".to_string(), true),
            ("_id".to_string(), false),
        ]
    );
}

#[test]
fn test_parse_query_sort() {
    let query = parse_query("sort(a,-b,+c)").unwrap();
    assert_eq!(
        query.sort,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), -1),
            ("c".to_string(), 1),
        ]
    );

    let query = parse_query("sort(+a,-b)&sort(-a,+b)").unwrap();
    assert_eq!(query.sort_order("a"), Some(-1));
    assert_eq!(query.sort_order("b"), Some(1));
}

#[test]
fn test_parse_query_limit() {
    let query = parse_query("limit(10,30)").unwrap();
    assert_eq!((query.limit, query.skip), (10, 30));

    let query = parse_query("limit(5)&limit(10,20)").unwrap();
    assert_eq!((query.limit, query.skip), (10, 20));

    let query = parse_query("limit(0,-5)").unwrap();
    assert_eq!((query.limit, query.skip), (-1, 0));

    let query = parse_query("limit(foo,bar)").unwrap();
    assert_eq!((query.limit, query.skip), (-1, 0));

    let query = parse_query("limit(string:10px)").unwrap();
    assert_eq!(query.limit, 10);
}

#[test]
fn test_parse_query_nested_special_terms_are_captured() {
    let query = parse_query("select(a,b)&a(select(c,d))").unwrap();
    assert_eq!(query.field("c"), Some(true));
    assert_eq!(query.field("a"), None);
}

#[test]
fn test_query_is_empty() {
    assert!(parse_query("").unwrap().is_empty());
    assert!(!parse_query("a=1").unwrap().is_empty());
    assert!(!parse_query("limit(1)").unwrap().is_empty());
}
