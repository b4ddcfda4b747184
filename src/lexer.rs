use crate::{
    ast::Token,
    error::{Error, Result},
};

/// Character offset into the normalized query text.
pub type Position = usize;

/// Splits normalized query text into punctuation and value words.
///
/// Whitespace is not skipped: query text is URL-safe, so anything outside
/// the value character set has to be percent-encoded.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

/// Characters allowed inside a word: `\w` plus `* - + . $ : %`.
pub fn is_value_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '*' | '-' | '+' | '.' | '$' | ':' | '%')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_value_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Returns the next token with the position it starts at.
    pub fn next_token(&mut self) -> Result<(Token, Position)> {
        let start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('&') => {
                self.advance();
                Token::Ampersand
            }
            Some('|') => {
                self.advance();
                Token::Pipe
            }
            Some(ch) if is_value_char(ch) => Token::Word(self.read_word()),
            Some(ch) => {
                return Err(Error::InvalidCharacter {
                    character: ch,
                    position: start,
                });
            }
        };

        Ok((token, start))
    }

    /// Collects every remaining token, for inspection and tests.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Position)>> {
        let mut tokens = Vec::new();
        loop {
            let (token, position) = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, position));
            if done {
                return Ok(tokens);
            }
        }
    }
}
