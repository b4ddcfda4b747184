//! Error types for parsing and value coercion.

use thiserror::Error;

use crate::lexer::Position;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while turning query text into a term tree.
///
/// The structured-query compiler never produces these: malformed operator
/// applications are dropped there instead of failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid character at position {position}: '{character}'")]
    InvalidCharacter { character: char, position: Position },

    #[error(
        "cannot mix conjunctions within a group at position {position}, \
         use parentheses around each set of the same conjunctions (& and |)"
    )]
    MixedConjunction { position: Position },

    #[error("empty value at position {position} is not allowed")]
    EmptyValueNotAllowed { position: Position },

    #[error("unmatched parenthesis at position {position}")]
    UnmatchedParenthesis { position: Position },

    #[error("unknown value converter: {0}")]
    UnknownConverter(String),

    #[error("invalid value for the '{converter}' converter: {value}")]
    InvalidValue { converter: String, value: String },
}

impl Error {
    pub(crate) fn invalid_value(converter: &str, value: &str) -> Self {
        Error::InvalidValue {
            converter: converter.to_string(),
            value: value.to_string(),
        }
    }
}
