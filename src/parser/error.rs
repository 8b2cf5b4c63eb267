// ABOUTME: Error types for placeholder parsing and static substitution
// ABOUTME: Parse errors classify malformed placeholders instead of aborting the parse

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Invalid static substitution '{key}': {source}")]
    InvalidSubstitution {
        key: String,
        #[source]
        source: regex::Error,
    },

    #[error("Static substitution key cannot be empty")]
    EmptySubstitutionKey,
}

/// Why a `{{...}}` token matched neither placeholder form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty placeholder")]
    Empty,

    #[error("placeholder must start with '/' (file) or '$' (variable)")]
    UnknownForm,

    #[error("file reference has an empty path")]
    EmptyPath,

    #[error("missing variable identifier")]
    MissingIdentifier,

    #[error("missing key after '.'")]
    MissingKey,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("missing filter name at offset {offset}")]
    MissingFilterName { offset: usize },

    #[error("unterminated argument for filter '{filter}'")]
    UnterminatedArgument { filter: String },

    #[error("nested parentheses are not supported in the argument for filter '{filter}'")]
    NestedParentheses { filter: String },

    #[error("unterminated quoted string in the argument for filter '{filter}'")]
    UnterminatedQuote { filter: String },

    #[error("expected 'default=' after '|'")]
    InvalidDefault,
}

pub type Result<T> = std::result::Result<T, ParserError>;
