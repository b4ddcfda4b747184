use std::{mem, sync::LazyLock};

use tracing::{debug, trace};

use crate::{
    ast::{AND, Node, OR, Query, Term, Token},
    converters::ConverterRegistry,
    error::{Error, Result},
    lexer::{Lexer, Position},
    normalize::normalize,
    special_terms,
    value::Value,
};

static DEFAULT_PARSER: LazyLock<Parser> = LazyLock::new(Parser::default);
static QUERY_PARSER: LazyLock<Parser> = LazyLock::new(Parser::for_queries);

/// Parses query text with the default options.
///
/// ```
/// use rql_lang::{parse, Term};
///
/// let tree = parse("a=1&b=2").unwrap();
/// assert!(tree.is_named("and"));
/// assert_eq!(tree.args.len(), 2);
/// ```
pub fn parse(input: &str) -> Result<Term> {
    DEFAULT_PARSER.parse(input)
}

/// Parses query text into a [`Query`], extracting `select`, `exclude`,
/// `sort` and `limit`.
///
/// ```
/// use rql_lang::parse_query;
///
/// let query = parse_query("select(a)&sort(-b)&limit(10,20)&a>1").unwrap();
/// assert_eq!(query.field("a"), Some(true));
/// assert_eq!(query.sort_order("b"), Some(-1));
/// assert_eq!((query.limit, query.skip), (10, 20));
/// ```
pub fn parse_query(input: &str) -> Result<Query> {
    QUERY_PARSER.parse_query(input)
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserOptions {
    /// Decode `%3C`, `%3E`, `%3C=`, `%3E=` into FIQL operators
    pub json_query_compatible: bool,

    /// Desugar `a=b`, `a<b`, `a=op=b` into prefix form
    pub fiql_compatible: bool,

    /// Read `a/b/c` as `(a,b,c)`
    pub allow_slashed_arrays: bool,

    /// Accept `a,,b`, inserting `empty_value` for the missing argument
    pub allow_empty_values: bool,

    /// Placeholder used for empty arguments
    pub empty_value: Value,

    /// Converter applied to tokens without a `name:` prefix
    pub default_converter: String,

    /// Term names whose arguments are captured while parsing
    pub special_terms: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            json_query_compatible: false,
            fiql_compatible: true,
            allow_slashed_arrays: false,
            allow_empty_values: false,
            empty_value: Value::String(String::new()),
            default_converter: "auto".to_string(),
            special_terms: Vec::new(),
        }
    }
}

impl ParserOptions {
    /// The options [`parse_query`] uses.
    pub fn for_queries() -> Self {
        ParserOptions {
            json_query_compatible: true,
            fiql_compatible: true,
            allow_slashed_arrays: true,
            allow_empty_values: false,
            special_terms: special_terms::NAMES.iter().map(|s| s.to_string()).collect(),
            ..ParserOptions::default()
        }
    }
}

/// Arguments of a special term, captured at its last occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialTerm {
    pub name: String,
    pub args: Vec<Node>,
}

/// What the last consumed token leaves the parser expecting.
enum Slot {
    /// Nothing pending; a `,` here adds no argument
    Open,
    /// Right after `,`; another `,` means an empty argument
    Separated,
    /// A word waiting to become an argument
    Token(String),
}

/// A term under construction.
struct Frame {
    term: Term,
    opened_at: Position,
    capture: Option<usize>,
}

struct Capture {
    id: usize,
    special: SpecialTerm,
}

/// Stack-based parser from query text to a [`Term`] tree.
///
/// Each instance owns its options and its converter table, so custom
/// converters registered on one parser never leak into another.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
    converters: ConverterRegistry,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Parser {
            options,
            converters: ConverterRegistry::default(),
        }
    }

    pub fn with_converters(options: ParserOptions, converters: ConverterRegistry) -> Self {
        Parser {
            options,
            converters,
        }
    }

    /// Parser configured with [`ParserOptions::for_queries`].
    pub fn for_queries() -> Self {
        Parser::new(ParserOptions::for_queries())
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }

    /// Parses text into a selector tree rooted in a logical group.
    pub fn parse(&self, input: &str) -> Result<Term> {
        self.run(input, false).map(|(term, _)| term)
    }

    /// Parses text, also returning the arguments of each special term.
    ///
    /// Only the last occurrence of a name is kept, and the result is ordered
    /// by where those last occurrences open.
    pub fn parse_with_special_terms(&self, input: &str) -> Result<(Term, Vec<SpecialTerm>)> {
        self.run(input, true)
    }

    /// Parses text into a [`Query`], feeding captured special terms to
    /// their handlers.
    pub fn parse_query(&self, input: &str) -> Result<Query> {
        let (selector, specials) = self.parse_with_special_terms(input)?;

        let mut query = Query {
            selector,
            ..Query::default()
        };
        for special in &specials {
            if !special_terms::apply(&mut query, &special.name, &special.args) {
                debug!(term = %special.name, "no handler for captured special term");
            }
        }

        Ok(query)
    }

    fn convert(&self, token: &str) -> Result<Node> {
        self.converters
            .convert(token, &self.options.default_converter)
            .map(Node::Value)
    }

    fn flush(&self, slot: &mut Slot, term: &mut Term) -> Result<()> {
        if let Slot::Token(token) = mem::replace(slot, Slot::Open) {
            term.args.push(self.convert(&token)?);
        }
        Ok(())
    }

    fn run(&self, input: &str, collect: bool) -> Result<(Term, Vec<SpecialTerm>)> {
        let text = normalize(input, &self.options);
        trace!(input, normalized = %text, "parsing query text");

        let mut lexer = Lexer::new(&text);
        let mut stack: Vec<Frame> = Vec::new();
        let mut current = Frame {
            term: Term::default(),
            opened_at: 0,
            capture: None,
        };
        let mut slot = Slot::Open;
        let mut captures: Vec<Capture> = Vec::new();
        let mut next_capture = 0;

        loop {
            let (token, position) = lexer.next_token()?;

            match token {
                Token::Word(word) => slot = Slot::Token(word),

                Token::LParen => {
                    let name = match mem::replace(&mut slot, Slot::Open) {
                        Slot::Token(name) => Some(name),
                        _ => None,
                    };

                    let mut capture = None;
                    if let Some(name) = &name
                        && collect
                        && self.options.special_terms.contains(name)
                    {
                        captures.retain(|c| c.special.name != *name);
                        captures.push(Capture {
                            id: next_capture,
                            special: SpecialTerm {
                                name: name.clone(),
                                args: Vec::new(),
                            },
                        });
                        capture = Some(next_capture);
                        next_capture += 1;
                    }

                    let child = Frame {
                        term: Term {
                            name,
                            args: Vec::new(),
                        },
                        opened_at: position,
                        capture,
                    };
                    stack.push(mem::replace(&mut current, child));
                }

                Token::Comma => {
                    match mem::replace(&mut slot, Slot::Separated) {
                        Slot::Separated if self.options.allow_empty_values => {
                            current
                                .term
                                .args
                                .push(Node::Value(self.options.empty_value.clone()));
                        }
                        Slot::Separated => return Err(Error::EmptyValueNotAllowed { position }),
                        Slot::Token(token) => current.term.args.push(self.convert(&token)?),
                        Slot::Open => {}
                    }
                }

                Token::RParen => {
                    self.flush(&mut slot, &mut current.term)?;

                    let parent = stack
                        .pop()
                        .ok_or(Error::UnmatchedParenthesis { position })?;
                    let closed = mem::replace(&mut current, parent);

                    if let Some(id) = closed.capture
                        && let Some(capture) = captures.iter_mut().find(|c| c.id == id)
                    {
                        capture.special.args = closed.term.args.clone();
                    }

                    let node = match closed.term.name {
                        None => Node::Array(closed.term.args),
                        Some(_) => Node::Term(closed.term),
                    };
                    current.term.args.push(node);
                }

                Token::Ampersand | Token::Pipe => {
                    let conjunction = if token == Token::Ampersand { AND } else { OR };

                    if current
                        .term
                        .name
                        .as_deref()
                        .is_some_and(|name| name != conjunction)
                    {
                        return Err(Error::MixedConjunction { position });
                    }
                    current.term.name = Some(conjunction.to_string());

                    if matches!(slot, Slot::Token(_)) {
                        self.flush(&mut slot, &mut current.term)?;
                    }
                }

                Token::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(Error::UnmatchedParenthesis {
                position: current.opened_at,
            });
        }

        self.flush(&mut slot, &mut current.term)?;

        let mut root = current.term;
        if root.name.is_none() {
            root.name = Some(AND.to_string());
        }

        if root.is_named(AND)
            && root.args.len() == 1
            && matches!(&root.args[0], Node::Term(inner) if inner.is_named(AND))
            && let Some(Node::Term(inner)) = root.args.pop()
        {
            root = inner;
        }

        Ok((root, captures.into_iter().map(|c| c.special).collect()))
    }
}
