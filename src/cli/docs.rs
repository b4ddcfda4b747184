//! Documentation content for the rql CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Converters,
    SpecialTerms,
    Mongo,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" | "fiql" => Some(Self::Operators),
            "converters" | "values" | "types" => Some(Self::Converters),
            "special_terms" | "special" | "paging" => Some(Self::SpecialTerms),
            "mongo" | "compile" => Some(Self::Mongo),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"RQL DOCUMENTATION

RQL is a URL-safe query language. Query text parses into a tree of terms,
which can be written back as canonical text or compiled into a document-store
query with a selector, projection, sort, limit and skip.

DOCUMENTATION CATEGORIES

  syntax            Terms, lists, conjunctions and the character set
  operators         Comparison operators and the FIQL shorthand
  converters        Typed values: string:, number:, date:, re:, glob: ...
  special-terms     select, exclude, sort and limit
  mongo             How terms compile to a document-store query

QUICK REFERENCE

  eq(a,1)           Term: name(arg,...)
  (1,2,3)           List
  a&b   a|b         and / or groups
  a=1  a>1  a=in=(1,2)
                    FIQL shorthand for eq(a,1), gt(a,1), in(a,(1,2))
  a(string:1)       Value converted by a named converter

Run 'rql doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Converters) => Ok(CONVERTERS_DOC),
        Some(DocCategory::SpecialTerms) => Ok(SPECIAL_TERMS_DOC),
        Some(DocCategory::Mongo) => Ok(MONGO_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Terms, Lists and Groups

TERMS
  name(arg1,arg2,...)
    An operator or function applied to its arguments. Arguments are values,
    lists or other terms.

    Example:
      Query:  a(b,c(d))
      Tree:   {"name":"and","args":[{"name":"a","args":["b",{"name":"c","args":["d"]}]}]}

LISTS
  (a,b,c)
    A parenthesized list without a name.

  a/b/c
    Slash shorthand for (a,b,c), enabled for full queries.

GROUPS
  a&b&c     and group
  a|b|c     or group
  a,b,c     top-level commas also form an and group

    Constraints:
      - & and | cannot be mixed at one level: use parentheses, a&(b|c)
      - and(a,b) around the whole query is the same as a&b

CHARACTERS
  Words may contain letters, digits and _ * - + . $ : %
  Everything else, including spaces, must be percent-encoded:
      a=hello%20world

  Adjacent commas (a,,b) are an error unless empty values are enabled.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Comparisons and FIQL

COMPARISON TERMS
  eq(a,b)    a=b    a==b    a=eq=b
  ne(a,b)    a!=b           a=ne=b
  lt(a,b)    a<b            a=lt=b
  le(a,b)    a<=b           a=le=b
  gt(a,b)    a>b            a=gt=b
  ge(a,b)    a>=b           a=ge=b
  in(a,(1,2))               a=in=(1,2)
  nin(a,(1,2))              a=nin=(1,2)
  all(a,(1,2))              a=all=(1,2)

CUSTOM OPERATORS
  a=name=b
    Any word between = signs becomes a term name: a=near=b is near(a,b).

ENCODED OPERATORS
  %3C  %3C=  %3E  %3E=
    Percent-encoded < <= > >= are accepted in full queries.

FIELD PATHS
  a.b.c            dotted path
  (a,b,c)=1        list path, same as a.b.c
"#;

const CONVERTERS_DOC: &str = r#"CONVERTERS - Typed Values

A token without a prefix is converted automatically:
  true false null undefined Infinity -Infinity    literals
  42  -1.5  0xFF  1e3                             numbers
  'quoted'                                        one layer of quotes removed
  anything else                                   string (percent-decoded)

PREFIXED VALUES
  string:123         always a string
  number:0xFF        number, error if not numeric
  boolean:1          true for "true" or "1", otherwise false
  null:  undefined:  constants
  epoch:1355674543236
                     milliseconds since 1970-01-01T00:00:00Z
  isodate:2012-12-18T10%3A26%3A59Z
                     ISO-8601 with optional parts: 2012, 2012-05, 2012-08-13T13
  date:Dec%2025%2C%201995
                     free-form date; no zone means UTC
  re:%5Efoo          regular expression; re:%2Ffoo%2Fi adds flags
  glob:*.txt         case-insensitive pattern; * any run, ? one character

Unknown prefixes are an error: a(data:1) fails with "unknown value converter".
"#;

const SPECIAL_TERMS_DOC: &str = r#"SPECIAL-TERMS - Projection, Sort and Paging

  select(a,b)        include fields a and b
  exclude(a,b)       exclude fields a and b
  sort(a,-b,+c)      ascending a, descending b, ascending c
  limit(10)          at most 10 results
  limit(10,20)       at most 10 results, skipping 20

  Constraints:
    - The last occurrence of each term wins; earlier ones are replaced
    - exclude(_id) alone keeps a preceding select
    - limit below 1 means no limit, negative skip means 0
    - Paths may be dotted (a.b) or lists ((a,b))
"#;

const MONGO_DOC: &str = r#"MONGO - Compiled Queries

  rql compile 'select(a)&a=1&b>10&(c=1|d<5)&limit(5,10)'

  {
    "selector": {"a": 1, "b": {"$gt": 10}, "$or": [{"c": 1}, {"d": {"$lt": 5}}]},
    "fields": {"a": true},
    "sort": {},
    "limit": 5,
    "skip": 10
  }

OPERATORS
  eq ne lt le gt ge in nin all    {path: value} / {path: {$op: value}}
  and                             merged into one document
  or  nor                         {$or: [...]} / {$nor: [...]}
  not(a=1,b>2)                    {a: {$ne: 1}, b: {$not: {$gt: 2}}}
  exists(a[,bool])                {a: {$exists: bool}}
  type(a,2)  size(a,3)            {a: {$type: 2}}  {a: {$size: 3}}
  mod(a,4,0)                      {a: {$mod: [4, 0]}}
  regex(a,pattern[,flags])        {a: {$regex: pattern, $options: flags}}
  elemMatch(a,cond,...)           {a: {$elemMatch: {...}}}
  where(code)                     {$where: code}, only with --allow-where

  Malformed terms are left out of the result instead of failing.

FIELD POLICY
  --whitelist a,b    only these paths
  --blacklist a,b    all paths except these
"#;
