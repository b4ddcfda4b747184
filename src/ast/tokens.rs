#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis, opens a term, group or array
    ///
    /// # Examples
    /// ```text
    /// eq(a,1)
    /// (a|b)
    /// (1,2,3)
    /// ```
    LParen,

    /// Right parenthesis
    RParen,

    /// Comma, separates arguments
    Comma,

    /// Ampersand, `and` conjunction
    ///
    /// # Examples
    /// ```text
    /// a=1&b=2
    /// ```
    Ampersand,

    /// Pipe, `or` conjunction
    ///
    /// # Examples
    /// ```text
    /// (a=1|b=2)
    /// ```
    Pipe,

    /// A run of value characters: term names, field names and raw values
    ///
    /// Words are still percent-encoded and may carry a `converter:` prefix;
    /// the parser hands them to the converter registry.
    ///
    /// # Examples
    /// ```text
    /// eq
    /// foo.bar
    /// string:123
    /// hello%20world
    /// ```
    Word(String),

    /// End of input
    Eof,
}
